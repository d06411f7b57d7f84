use anyhow::Result;
use serde_json::json;

use tubeprobe::{Config, MediaKind};

use super::{format_size, service};
use crate::OutputFormat;

pub async fn cmd_fetch(
    config: &Config,
    reference: &str,
    kind: MediaKind,
    quality: Option<u32>,
    format: OutputFormat,
) -> Result<()> {
    let variant = service(config)?
        .fetch_variant(reference, kind, quality)
        .await?;

    match format {
        OutputFormat::Json => {
            let payload = json!({
                "ok": true,
                "url": variant.url,
                "filename": variant.filename,
                "size": variant.size,
                "type": kind.default_extension(),
                "quality": variant.quality_number,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            println!("📄 {}", variant.filename);
            println!("🎚  {} ({})", variant.quality, format_size(variant.size));
            println!("🔗 {}", variant.url);
        }
    }

    Ok(())
}
