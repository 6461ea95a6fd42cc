use super::Interceptor;
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Writes one markdown transcript per generation attempt.
#[derive(Debug)]
pub struct FileInterceptor {
    base_path: PathBuf,
}

impl FileInterceptor {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

#[async_trait]
impl Interceptor for FileInterceptor {
    async fn save(&self, topic: &str, prompt: &str, response: &str) -> std::io::Result<()> {
        let timestamp = Utc::now();
        let filename = format!("quiz_{}.md", timestamp.format("%Y%m%d_%H%M%S_%6f"));
        let file_path = self.base_path.join(filename);

        fs::create_dir_all(&self.base_path).await?;

        let content = format!(
            "# Topic\n\n{}\n\n# Prompt\n\n{}\n\n# Response\n\n{}\n",
            topic, prompt, response
        );

        let mut file = fs::File::create(&file_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let interceptor = FileInterceptor::new(dir.path().join("transcripts"));

        interceptor.save("Rust", "the prompt", "the response").await.unwrap();

        let mut entries = std::fs::read_dir(interceptor.base_path()).unwrap();
        let path = entries.next().unwrap().unwrap().path();
        let body = std::fs::read_to_string(path).unwrap();
        assert!(body.contains("# Prompt\n\nthe prompt"));
        assert!(body.contains("# Response\n\nthe response"));
    }
}
