use std::path::Path;
use std::process::Command;

use vshort_media::{check_ffmpeg, check_ffprobe};
use vshort_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "vshort-selfcheck: starting with work_dir={} output_dir={}",
        config.work_dir.display(),
        config.output_dir.display()
    );
    ensure_dir(&config.work_dir).await?;
    ensure_dir(&config.output_dir).await?;
    ensure_tool("ffmpeg", check_ffmpeg()?.as_path())?;
    ensure_tool("ffprobe", check_ffprobe()?.as_path())?;

    println!("vshort-selfcheck: ok");
    Ok(())
}

async fn ensure_dir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;
    Ok(())
}

fn ensure_tool(name: &str, path: &Path) -> anyhow::Result<()> {
    let output = Command::new(path)
        .arg("-version")
        .output()
        .map_err(|e| anyhow::anyhow!("{} not runnable: {}", name, e))?;

    if !output.status.success() {
        return Err(anyhow::anyhow!(
            "{} -version failed: {:?}",
            name,
            output.status
        ));
    }
    println!("vshort-selfcheck: {} at {}", name, path.display());
    Ok(())
}
