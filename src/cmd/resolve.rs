use anyhow::Result;
use serde_json::json;

use tubeprobe::{Config, ResolutionResult, ResolvedVariant};

use super::{format_size, service};
use crate::OutputFormat;

pub async fn cmd_resolve(config: &Config, reference: &str, format: OutputFormat) -> Result<()> {
    let result = service(config)?.resolve(reference).await?;

    match format {
        OutputFormat::Json => {
            let payload = json!({
                "ok": true,
                "metadata": result.metadata,
                "downloads": result.downloads,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => print_summary(&result),
    }

    Ok(())
}

fn print_summary(result: &ResolutionResult) {
    let meta = &result.metadata;
    println!("🎬 {}", meta.title);
    println!("👤 {}  ⏱  {}  👁  {}", meta.author, meta.duration, meta.views);
    if let Some(thumbnail) = &meta.thumbnail {
        println!("🖼  {thumbnail}");
    }

    print_variants("📹 Video", &result.downloads.video);
    print_variants("🎵 Audio", &result.downloads.audio);

    if result.is_empty() {
        println!("\n⚠️  No downloadable variants found");
    }
}

fn print_variants(heading: &str, variants: &[ResolvedVariant]) {
    if variants.is_empty() {
        return;
    }
    println!("\n{heading}:");
    for v in variants {
        println!("   {:>8}  {}  ({})", v.quality, v.filename, format_size(v.size));
        println!("             {}", v.url);
    }
}
