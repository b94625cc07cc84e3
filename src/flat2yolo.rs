use clap::Parser;
use log::{error, info};

use gtruth2flat::utils::create_progress_bar;
use gtruth2flat::{create_data_yaml, export_yolo_labels, read_flat_dataset, YoloArgs};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = YoloArgs::parse();

    let dataset = match read_flat_dataset(&args.flat) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Failed to read flat dataset: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting the YOLO conversion process...");
    let pb = create_progress_bar(dataset.image_files.len() as u64, "Labels");
    match export_yolo_labels(&dataset, &args, &pb) {
        Ok(stats) => {
            pb.finish_with_message("Label export complete");
            stats.print_summary();
        }
        Err(e) => {
            error!("Failed to set up label directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = create_data_yaml(&args, &dataset.label_names) {
        error!("Failed to create data.yaml: {}", e);
        std::process::exit(1);
    }
    info!("Labels dir: {}", args.labels_out.display());
    info!("Conversion process completed successfully.");
}
