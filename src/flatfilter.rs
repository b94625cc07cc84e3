use clap::Parser;
use log::{error, info};

use gtruth2flat::{read_flat_dataset, write_flat_dataset, ExportError, FilterArgs};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = FilterArgs::parse();

    if let Err(e) = run(&args) {
        error!("Filtering failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &FilterArgs) -> Result<(), ExportError> {
    let mut dataset = read_flat_dataset(&args.in_flat)?;
    let total = dataset.image_files.len();

    let removed = dataset.drop_empty_images();
    info!("Total images: {}", total);
    info!("With polygons: {}", total - removed);
    info!("Removed: {}", removed);

    if args.drop_empty_labels {
        let dropped = dataset.drop_empty_labels();
        if !dropped.is_empty() {
            info!("Dropped label columns: {}", dropped.join(", "));
        }
    }

    write_flat_dataset(&args.out_flat, &dataset)?;
    info!("Saved {}", args.out_flat.display());
    Ok(())
}
