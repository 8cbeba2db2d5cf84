use anyhow::Result;

pub trait HttpClient {
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}
