use std::error::Error;
use std::path::PathBuf;

use context::{ConfusionMatrix, SavedModel, TrainOptions, sessions, train};
use signal::{FeatureVector, FilterConfig, feature_windows, low_pass, preprocess};

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Data directory with one subdirectory per activity label
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("data"), required = false)]
    pub data: PathBuf,
    /// Output model file. _Note_: will truncate old file if exists
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("context.json"), required = false)]
    pub output: PathBuf,
    /// Samples per feature window
    #[arg(long, default_value_t = signal::DEFAULT_WINDOW_SIZE)]
    pub window_size: usize,
    /// Sampling rate of the recordings in Hz
    #[arg(long, default_value_t = 50.0)]
    pub sample_rate: f64,
    /// Low-pass cutoff in Hz
    #[arg(long, default_value_t = 5.0)]
    pub cutoff: f64,
    /// Fraction of windows held out for evaluation
    #[arg(long, default_value_t = 0.3)]
    pub holdout: f64,
    /// Seed for the holdout shuffle
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
    /// Don't save changes
    #[arg(short, long, default_value_t = false, required = false)]
    pub dry: bool,
    /// Print result to stdout
    #[arg(short, long, default_value_t = false, required = false)]
    pub print: bool,
}

fn load_windows(
    recordings: &[sessions::Session],
    filter: &FilterConfig,
    window_size: usize,
    dry: bool,
) -> Result<Vec<(FeatureVector, String)>, Box<dyn Error>> {
    let mut windows = Vec::new();

    for session in recordings {
        if !dry {
            sessions::rewrite_timestamps(&session.path)
                .map_err(|e| format!("Failed to normalize timestamps. Reason: {e}"))?;

            if let Some(gyro) = &session.gyro {
                sessions::rewrite_timestamps(gyro)
                    .map_err(|e| format!("Failed to normalize timestamps. Reason: {e}"))?;
            }
        }

        log::info!("loading {}", session.path.display());

        let samples = sessions::load_accelerometer(&session.path)
            .map_err(|e| format!("Failed to load session. Reason: {e}"))?;

        let filtered = low_pass(preprocess(samples)?, filter)?;

        for feature in feature_windows(&filtered, window_size)? {
            windows.push((feature, session.label.clone()));
        }
    }

    Ok(windows)
}

fn print_confusion(confusion: &ConfusionMatrix) {
    let width = confusion
        .labels()
        .iter()
        .map(|label| label.len())
        .max()
        .unwrap_or_default()
        .max(7);

    print!("{:>width$} |", "truth");
    for label in confusion.labels() {
        print!(" {label:>width$}");
    }
    println!();

    for (row, label) in confusion.labels().iter().enumerate() {
        print!("{label:>width$} |");
        for column in 0..confusion.labels().len() {
            print!(" {:>width$}", confusion.count(row, column));
        }
        println!();
    }
}

fn print_class_report(confusion: &ConfusionMatrix) {
    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>8}",
        "context", "precision", "recall", "f1", "support"
    );

    for (class, label) in confusion.labels().iter().enumerate() {
        println!(
            "{label:>10} {:>10.3} {:>10.3} {:>10.3} {:>8}",
            confusion.precision(class),
            confusion.recall(class),
            confusion.f1(class),
            confusion.support(class),
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let Args {
        data,
        output,
        window_size,
        sample_rate,
        cutoff,
        holdout,
        seed,
        dry,
        print,
    } = <Args as clap::Parser>::parse();

    let filter = FilterConfig::new()
        .set_sample_rate_hz(sample_rate)
        .set_cutoff_hz(cutoff);

    let recordings = sessions::labeled_sessions(&data)
        .map_err(|e| format!("Failed to list sessions. Reason: {e}"))?;

    println!("Number of sessions for training: {}", recordings.len());

    let windows = load_windows(&recordings, &filter, window_size, dry)?;

    println!("Number of windows for training: {}", windows.len());

    let options = TrainOptions {
        holdout,
        seed,
        window_size,
        filter,
    };

    let (model, confusion): (SavedModel, _) = train(windows, &options)
        .map_err(|e| format!("Failed to train context model. Reason: {e}"))?;

    println!("Holdout accuracy: {:.3}", confusion.accuracy());
    println!();
    print_confusion(&confusion);
    println!();
    print_class_report(&confusion);

    if print {
        println!(
            "{}",
            serde_json::to_string_pretty(&model).expect("serde serialization can't fail")
        );
    }

    if !dry {
        println!("Save to {}", output.to_string_lossy());

        std::fs::write(
            &output,
            serde_json::to_string_pretty(&model).expect("serde serialization can't fail"),
        )
        .map_err(|e| format!("Failed to save model. Reason: {e}"))?;
    }

    println!("Done!");

    Ok(())
}
