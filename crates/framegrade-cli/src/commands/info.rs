use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use framegrade_core::io::probe_source;

#[derive(Args)]
pub struct InfoArgs {
    /// Input video, SER file, image or image directory
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let info = probe_source(&args.file)?;

    println!("File:        {}", info.path.display());
    println!("Source:      {}", info.kind);
    if let (Some(w), Some(h)) = (info.width, info.height) {
        println!("Dimensions:  {}x{}", w, h);
    }
    if let Some(n) = info.total_frames {
        println!("Frames:      {}", n);
    }
    if let Some(rate) = info.frame_rate {
        println!("Frame rate:  {:.3} fps", rate);
    }
    if let Some(duration) = info.duration_s {
        println!("Duration:    {:.2} s", duration);
    }
    if let Some(ref detail) = info.detail {
        println!("Details:     {}", detail);
    }

    Ok(())
}
