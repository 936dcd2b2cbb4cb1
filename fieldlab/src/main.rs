#![deny(clippy::all)]
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use fieldlab_domain::FlResult;
use fllib::{
    cfg::{get_cfg, write_cfg},
    file_util::path_to_str,
    result::trace_ok_err,
    tracing_setup, ImageDatabase, LabeledImage,
};
use std::{
    ops::Deref,
    panic,
    path::{Path, PathBuf},
};
use tracing::info;
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

fn image_paths_in_folder(folder: &Path) -> FlResult<Vec<String>> {
    let mut paths = vec![];
    for entry in WalkDir::new(folder).into_iter().flatten() {
        let path = entry.path();
        let is_image = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()));
        if is_image {
            paths.push(path_to_str(path)?.to_string());
        }
    }
    paths.sort();
    Ok(paths)
}

fn new_db_via_cli(db_path: &Path, image_folder: &Path) -> FlResult<()> {
    let mut db = ImageDatabase::new();
    db.create_new();
    for path in image_paths_in_folder(image_folder)? {
        db.add_image(LabeledImage::new(path));
    }
    info!("created database with {} images", db.images().len());
    db.write_to_file(db_path)?;
    let mut cfg = get_cfg()?;
    cfg.current_db_path = Some(path_to_str(db_path)?.to_string());
    write_cfg(&cfg)
}

fn export_via_cli(db_path: &Path, out_path: &Path) -> FlResult<()> {
    let mut db = ImageDatabase::new();
    db.read_from_file(db_path)?;
    db.export_to_json(out_path)?;
    info!(
        "exported {} images with {} labels",
        db.images().len(),
        db.images()
            .iter()
            .map(|im| im.labels().n_labels())
            .sum::<usize>()
    );
    Ok(())
}

#[derive(Parser)]
#[command(version, about = "image annotation database for labeled soccer frames")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}
#[derive(Subcommand)]
enum Command {
    /// Create a new database from all images found below a folder
    New {
        db_path: PathBuf,
        image_folder: PathBuf,
    },
    /// Export a database to the downstream json format
    Export { db_path: PathBuf, out_path: PathBuf },
}

fn main() {
    let _guard_flush_to_logfile = tracing_setup::tracing_setup();
    if let Err(e) = panic::catch_unwind(|| {
        let cli = Cli::parse();
        match cli.command {
            Command::New {
                db_path,
                image_folder,
            } => {
                trace_ok_err(new_db_via_cli(&db_path, &image_folder));
            }
            Command::Export { db_path, out_path } => {
                trace_ok_err(export_via_cli(&db_path, &out_path));
            }
        }
    }) {
        let panic_s = e
            .downcast_ref::<String>()
            .map(String::as_str)
            .or_else(|| e.downcast_ref::<&'static str>().map(Deref::deref));
        tracing::error!("{:?}", panic_s);
        let b = tracing_setup::BACKTRACE
            .with(|b| b.borrow_mut().take())
            .unwrap();
        tracing::error!("{:?}", b);
    }
}
