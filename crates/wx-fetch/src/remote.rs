//! HTTP zip download and station-file extraction

use std::io::{Cursor, Read, Seek};
use std::path::Path;
use std::time::Duration;

use tracing::{info, instrument};
use url::Url;
use zip::ZipArchive;

use wx_core::DatasetProvider;

use crate::{FetchError, FetchResult};

/// Directory inside the archive holding the per-station files
pub const DATASET_DIR_IN_ARCHIVE: &str = "wx_data/";

/// Fetches the dataset archive over HTTP and extracts the station files
pub struct HttpZipFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpZipFetcher {
    pub fn new(url: Url) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client, url })
    }

    /// Download the archive and extract the station files into `dest`.
    ///
    /// Returns the number of files extracted.
    #[instrument(skip(self))]
    pub async fn download_and_extract(&self, dest: &Path) -> FetchResult<usize> {
        info!(url = %self.url, "downloading dataset archive");
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;

        info!("downloaded {} bytes, extracting", bytes.len());
        let extracted = extract_station_files(Cursor::new(bytes.as_ref()), dest)?;

        info!("extracted {} station files to {}", extracted, dest.display());
        Ok(extracted)
    }
}

#[async_trait::async_trait]
impl DatasetProvider for HttpZipFetcher {
    async fn provide(&self, dest: &Path) -> anyhow::Result<()> {
        self.download_and_extract(dest).await?;
        Ok(())
    }
}

/// Extract every `.txt` entry under the dataset directory into `dest`,
/// flattened to the bare file name.
pub fn extract_station_files<R: Read + Seek>(reader: R, dest: &Path) -> FetchResult<usize> {
    let mut archive = ZipArchive::new(reader)?;
    std::fs::create_dir_all(dest)?;

    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();
        if !name.contains(DATASET_DIR_IN_ARCHIVE) || !name.ends_with(".txt") {
            continue;
        }
        let Some(file_name) = Path::new(&name).file_name() else {
            continue;
        };

        let mut out = std::fs::File::create(dest.join(file_name))?;
        std::io::copy(&mut entry, &mut out)?;
        extracted += 1;
    }

    if extracted == 0 {
        return Err(FetchError::NoStationFiles(
            DATASET_DIR_IN_ARCHIVE.to_string(),
        ));
    }
    Ok(extracted)
}
