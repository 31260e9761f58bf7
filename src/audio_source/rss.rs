//! RSS feed resolution.
//!
//! Parses a podcast feed, takes the first episode only, and downloads its
//! audio enclosure for transcription.

use super::ResolvedAudio;
use crate::error::{GranskaError, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;
use uuid::Uuid;

const FEED_TIMEOUT_SECS: u64 = 30;

/// Resolve an RSS feed URL to a downloaded audio file.
///
/// Fails on malformed or empty feeds. A first episode without an audio
/// enclosure resolves to [`ResolvedAudio::NoAudio`].
#[instrument(skip(download_dir))]
pub async fn resolve_rss(feed_url: &str, download_dir: &Path) -> Result<ResolvedAudio> {
    Url::parse(feed_url)
        .map_err(|e| GranskaError::InvalidInput(format!("Invalid RSS URL '{}': {}", feed_url, e)))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FEED_TIMEOUT_SECS))
        .build()?;

    let bytes = client
        .get(feed_url)
        .send()
        .await
        .map_err(|e| GranskaError::Feed(format!("RSS feed fetch failed: {}", e)))?
        .error_for_status()
        .map_err(|e| GranskaError::Feed(format!("RSS feed fetch failed: {}", e)))?
        .bytes()
        .await
        .map_err(|e| GranskaError::Feed(format!("Failed to read RSS feed body: {}", e)))?;

    let feed = feed_rs::parser::parse(&bytes[..])
        .map_err(|e| GranskaError::Feed(format!("Failed to parse RSS feed: {}", e)))?;

    let Some(audio_url) = first_episode_audio(&feed)? else {
        info!("RSS feed's first episode has no audio enclosure");
        return Ok(ResolvedAudio::NoAudio);
    };

    info!("Downloading episode audio from {}", audio_url);

    let audio = client
        .get(&audio_url)
        .send()
        .await
        .map_err(|e| GranskaError::AudioDownload(format!("Episode download failed: {}", e)))?
        .error_for_status()
        .map_err(|e| GranskaError::AudioDownload(format!("Episode download failed: {}", e)))?
        .bytes()
        .await
        .map_err(|e| GranskaError::AudioDownload(format!("Episode download failed: {}", e)))?;

    tokio::fs::create_dir_all(download_dir).await?;
    let path = download_dir.join(format!("episode_{}.mp3", Uuid::new_v4()));
    tokio::fs::write(&path, &audio).await?;

    info!("Downloaded episode to {}", path.display());
    Ok(ResolvedAudio::File(path))
}

/// Pick the audio enclosure URL of the feed's first episode, if any.
///
/// Errors when the feed parsed but contains no entries.
fn first_episode_audio(feed: &feed_rs::model::Feed) -> Result<Option<String>> {
    let Some(episode) = feed.entries.first() else {
        return Err(GranskaError::Feed(
            "RSS parsed but contains no entries".to_string(),
        ));
    };

    Ok(enclosure_url(episode))
}

/// Find the enclosure URL in a feed entry.
///
/// feed-rs surfaces RSS `<enclosure>` elements as media content; Atom-style
/// enclosure links are checked as a fallback.
fn enclosure_url(entry: &feed_rs::model::Entry) -> Option<String> {
    let media = entry
        .media
        .iter()
        .flat_map(|m| m.content.iter())
        .find_map(|c| c.url.as_ref().map(|u| u.to_string()));
    if media.is_some() {
        return media;
    }

    entry
        .links
        .iter()
        .find(|l| l.rel.as_deref() == Some("enclosure"))
        .map(|l| l.href.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_WITH_ENCLOSURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Podcast</title>
    <item>
      <title>Episode 1</title>
      <enclosure url="https://cdn.example.com/ep1.mp3" length="1024" type="audio/mpeg"/>
    </item>
    <item>
      <title>Episode 2</title>
      <enclosure url="https://cdn.example.com/ep2.mp3" length="1024" type="audio/mpeg"/>
    </item>
  </channel>
</rss>"#;

    const FEED_WITHOUT_ENCLOSURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Test Podcast</title>
    <item>
      <title>Episode 1</title>
      <description>A text-only entry</description>
    </item>
  </channel>
</rss>"#;

    const EMPTY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Empty Podcast</title>
  </channel>
</rss>"#;

    #[test]
    fn test_first_episode_enclosure() {
        let feed = feed_rs::parser::parse(FEED_WITH_ENCLOSURE.as_bytes()).unwrap();
        let url = first_episode_audio(&feed).unwrap();
        assert_eq!(url.as_deref(), Some("https://cdn.example.com/ep1.mp3"));
    }

    #[test]
    fn test_no_enclosure_is_soft() {
        let feed = feed_rs::parser::parse(FEED_WITHOUT_ENCLOSURE.as_bytes()).unwrap();
        let url = first_episode_audio(&feed).unwrap();
        assert!(url.is_none());
    }

    #[test]
    fn test_empty_feed_is_error() {
        let feed = feed_rs::parser::parse(EMPTY_FEED.as_bytes()).unwrap();
        let err = first_episode_audio(&feed).unwrap_err();
        assert!(err.to_string().contains("no entries"));
    }

    #[test]
    fn test_malformed_feed_fails_parse() {
        assert!(feed_rs::parser::parse("not xml at all".as_bytes()).is_err());
    }
}
