use super::client::HttpClient;
use anyhow::Result;
use std::time::Duration;

pub struct BasicClient(reqwest::blocking::Client);

impl BasicClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self(client))
    }
}

impl HttpClient for BasicClient {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.0.get(url).send()?.error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }
}
