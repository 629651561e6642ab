use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, loop_threshold: Option<u64>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if let Some(max) = loop_threshold {
        settings.loop_threshold = max;
    }
    save_settings(&settings)?;
    std::fs::create_dir_all(&settings.data_dir)?;

    println!("Data dir:       {}", settings.data_dir);
    println!("Loop threshold: {} rows per phase", settings.loop_threshold);
    println!("Image limit:    {} MB per archive", settings.image_archive_mb);
    Ok(())
}
