use std::{collections::BTreeMap, error::Error, fs::File, io::Write, path::PathBuf};

use context::{SavedModel, dominant_context, sessions};
use signal::{low_pass, preprocess};
use steps::{ContextParams, PeakParams, count_steps};

#[derive(Debug, serde::Serialize)]
pub struct Report {
    session: String,
    expected: String,
    predicted: String,
    windows: usize,
    steps: usize,
}

#[derive(Debug, clap::Parser)]
pub struct Args {
    /// Data directory with one subdirectory per activity label
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("data"), required = false)]
    pub data: PathBuf,
    /// Output csv file. _Note_: will truncate old file if exists
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("output.csv"), required = false)]
    pub output: PathBuf,
    /// Model json file
    #[arg(default_value_os_t = std::env::current_dir().unwrap_or_default().join("context.json"), required = false)]
    pub model: PathBuf,
    /// Json file with per-context peak parameter overrides
    #[arg(long)]
    pub params: Option<PathBuf>,
    /// Don't save changes
    #[arg(short, long, default_value_t = false, required = false)]
    pub dry: bool,
    /// Print result to stdout
    #[arg(short, long, default_value_t = false, required = false)]
    pub print: bool,
}

fn load_params(path: Option<PathBuf>) -> Result<ContextParams, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(ContextParams::new());
    };

    let overrides = serde_json::from_reader::<_, BTreeMap<String, PeakParams>>(
        File::open(path).map_err(|e| format!("Failed to open params. Reason {e}"))?,
    )
    .map_err(|e| format!("Failed to init params. Reason {e}"))?;

    Ok(overrides
        .into_iter()
        .fold(ContextParams::new(), |table, (label, params)| {
            table.with_context(label, params)
        }))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let Args {
        data,
        output,
        model,
        params,
        dry,
        print,
    } = <Args as clap::Parser>::parse();

    let model = serde_json::from_reader::<_, SavedModel>(
        File::open(model).map_err(|e| format!("Failed to open model. Reason {e}"))?,
    )
    .map_err(|e| format!("Failed to init model. Reason {e}"))?;

    let params = load_params(params)?;

    let recordings = sessions::labeled_sessions(&data)
        .map_err(|e| format!("Failed to list sessions. Reason: {e}"))?;

    println!("Total: {} sessions", recordings.len());

    let mut wrt = csv::Writer::from_path(&output);

    let mut io = match print {
        true => {
            let io = std::io::stdout();

            let mut io = io.lock();

            io.write_all("session,expected,predicted,windows,steps\n".as_bytes())?;

            Some(io)
        }
        false => None,
    };

    for session in recordings {
        log::info!("processing {}", session.path.display());

        let samples = sessions::load_accelerometer(&session.path)
            .map_err(|e| format!("Failed to load session. Reason: {e}"))?;

        let filtered = low_pass(preprocess(samples)?, &model.filter)?;

        let labels = model.classify(&filtered)?;
        let predicted = dominant_context(labels.iter().copied()).unwrap_or("unknown");

        let count = count_steps(
            filtered.iter().map(|this| this.magnitude),
            predicted,
            &params,
        );

        println!(
            "{}: {predicted} | {} windows | {count} steps",
            session.path.display(),
            labels.len(),
        );

        if let Some(io) = &mut io {
            io.write_fmt(format_args!(
                "{},{},{predicted},{},{count}\n",
                session.path.display(),
                session.label,
                labels.len(),
            ))?;
        }

        if dry {
            continue;
        }

        if let Ok(wrt) = &mut wrt {
            wrt.serialize(Report {
                session: session.path.to_string_lossy().into_owned(),
                expected: session.label.clone(),
                predicted: predicted.to_string(),
                windows: labels.len(),
                steps: count,
            })?;
        }
    }

    if !dry {
        println!("Saving to {}", output.to_string_lossy());
        wrt?.flush()?;
    }

    println!("Done!");

    Ok(())
}
