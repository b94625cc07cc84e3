use clap::Parser;
use log::{error, info};

use gtruth2flat::utils::create_progress_bar;
use gtruth2flat::{
    build_flat_dataset, load_ground_truth, write_flat_dataset, ExportArgs, ExportError,
};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ExportArgs::parse();

    if let Err(e) = run(&args) {
        error!("Export failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &ExportArgs) -> Result<(), ExportError> {
    info!("Loading ground truth from {}", args.input.display());
    let ground_truth = load_ground_truth(&args.input, args.variable.as_deref())?;
    let (n_images, n_labels) = ground_truth.dims();
    info!("Found {} images and {} labels", n_images, n_labels);

    let pb = create_progress_bar(n_images as u64, "Normalize");
    let mut dataset = build_flat_dataset(&ground_truth, &pb);
    pb.finish_with_message("Normalization complete");
    info!("Normalized {} polygons", dataset.polygon_count());

    if args.drop_empty_labels {
        let dropped = dataset.drop_empty_labels();
        if dropped.is_empty() {
            info!("No empty label columns to drop");
        } else {
            info!(
                "Dropped {} empty label columns: {}",
                dropped.len(),
                dropped.join(", ")
            );
        }
    }

    if args.drop_empty_images {
        let removed = dataset.drop_empty_images();
        info!("Dropped {} images without polygons", removed);
    }

    write_flat_dataset(&args.output, &dataset)?;
    let (n, c) = dataset.dims();
    info!("Saved {} with (N, C) = ({}, {})", args.output.display(), n, c);
    Ok(())
}
