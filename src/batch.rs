use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use crate::config::{BatchConfig, SkinToneConfig};
use crate::error::{SkinToneError, SkinToneResult};
use crate::{helpers, process};

/// One input file and where its result goes. Consumed exactly once.
#[derive(Debug, Clone)]
pub struct FileTask {
    pub input: PathBuf,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub skin_coverage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    pub input: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub discovered: usize,
    pub succeeded: Vec<ProcessedFile>,
    pub failed: Vec<FailedFile>,
}

pub fn run(config: &BatchConfig) -> SkinToneResult<BatchReport> {
    let BatchConfig { input_dir, output_dir, tone, jobs } = config;
    tone.validate()?;

    let files = enumerate(input_dir)?;
    prepare_output_dir(output_dir)?;

    println!("Found {} image(s) to process...", files.len());
    let (tasks, collisions) = plan(files, output_dir);

    let pool = ThreadPoolBuilder::new()
        .num_threads(*jobs)
        .build()
        .map_err(|e| SkinToneError::InvalidConfig(format!("cannot start {jobs} worker(s): {e}")))?;
    log::debug!("processing with {} worker(s)", pool.current_num_threads());

    let total = tasks.len() + collisions.len();
    let counter = AtomicUsize::new(0);
    let results: Vec<_> = pool.install(|| {
        tasks.into_par_iter()
            .map(|task| {
                let result = run_task(&task, tone);
                let count = counter.fetch_add(1, Ordering::Relaxed) + 1;
                match &result {
                    Ok(done) => {
                        log::info!("[{count}/{total}] {} -> {} (skin {:.1}%)", task.input.display(), task.output.display(), done.skin_coverage * 100.);
                        println!("Saved processed image to {}", task.output.display());
                    }
                    Err(e) => {
                        log::warn!("[{count}/{total}] {}: {e}", task.input.display());
                        println!("Skipping {} due to error during processing: {e}", display_name(&task.input));
                    }
                }
                (task.input, result)
            })
            .collect()
    });

    let mut report = BatchReport { discovered: total, ..Default::default() };
    for (input, result) in results.into_iter().chain(collisions.into_iter().map(|(input, e)| (input, Err(e)))) {
        match result {
            Ok(done) => report.succeeded.push(done),
            Err(e) => report.failed.push(FailedFile { input, reason: e.to_string() }),
        }
    }
    report.failed.sort_by(|a, b| a.input.cmp(&b.input));

    println!("Batch processing complete! {} succeeded, {} failed.", report.succeeded.len(), report.failed.len());
    Ok(report)
}

fn run_task(task: &FileTask, tone: &SkinToneConfig) -> SkinToneResult<ProcessedFile> {
    let processed = process::process(&task.input, tone)?;
    helpers::save_image(&processed.image, &task.output)?;
    Ok(ProcessedFile {
        input: task.input.clone(),
        output: task.output.clone(),
        skin_coverage: processed.coverage,
    })
}

/// Supported image files directly inside `dir`, sorted by file name.
pub fn enumerate(dir: &Path) -> SkinToneResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(SkinToneError::invalid_directory(dir, "input directory does not exist"));
    }
    let entries = fs::read_dir(dir).map_err(|e| SkinToneError::invalid_directory(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SkinToneError::invalid_directory(dir, e))?.path();
        if !path.is_file() {
            continue;
        }
        if helpers::is_supported_image(&path) {
            files.push(path);
        } else {
            log::debug!("ignoring {}", path.display());
        }
    }
    files.sort_by_key(|path| path.file_name().map(|name| name.to_owned()));
    Ok(files)
}

fn prepare_output_dir(dir: &Path) -> SkinToneResult<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(SkinToneError::invalid_directory(dir, "output path is not a directory"));
    }
    fs::create_dir_all(dir).map_err(|e| SkinToneError::invalid_directory(dir, e))
}

/// Pairs every file with its output path. Files whose output name equals an earlier one ignoring case
/// are split off as failures so nothing gets silently overwritten on case-insensitive filesystems.
fn plan(files: Vec<PathBuf>, output_dir: &Path) -> (Vec<FileTask>, Vec<(PathBuf, SkinToneError)>) {
    let mut seen: HashMap<OsString, PathBuf> = HashMap::new();
    let mut tasks = Vec::new();
    let mut rejected = Vec::new();
    for input in files {
        let Some(output) = helpers::output_path(&input, output_dir) else {
            let reason = SkinToneError::InvalidImageFormat(format!("{} has no file name", input.display()));
            rejected.push((input, reason));
            continue;
        };
        let key = output.as_os_str().to_ascii_lowercase();
        if let Some(other) = seen.get(&key) {
            let err = SkinToneError::OutputCollision { path: input.clone(), other: other.clone() };
            rejected.push((input, err));
            continue;
        }
        seen.insert(key, input.clone());
        tasks.push(FileTask { input, output });
    }
    (tasks, rejected)
}

fn display_name(path: &Path) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(dir: &Path, name: &str) {
        RgbImage::from_fn(10, 10, |x, y| Rgb([200 + x as u8, 120 + y as u8, 100])).save(dir.join(name)).unwrap();
    }

    fn outputs(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir).unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn skips_non_images_and_processes_the_rest() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_image(input.path(), "a.png");
        fs::write(input.path().join("b.txt"), "not an image").unwrap();
        write_image(input.path(), "c.jpg");

        let report = run(&BatchConfig::new(input.path(), output.path())).unwrap();
        assert_eq!(report.discovered, 2);
        assert_eq!(report.succeeded.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(outputs(output.path()), ["processed_a.png", "processed_c.jpg"]);
        assert_eq!(helpers::load_image(output.path().join("processed_a.png")).unwrap().dimensions(), (10, 10));
    }

    #[test]
    fn corrupt_file_does_not_stop_the_batch() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(input.path().join("bad.png"), b"").unwrap();
        write_image(input.path(), "good.png");

        let report = run(&BatchConfig::new(input.path(), output.path())).unwrap();
        assert_eq!(report.discovered, 2);
        assert_eq!(report.succeeded.len(), 1);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].input, input.path().join("bad.png"));
        assert!(report.failed[0].reason.contains("bad.png"));
        assert_eq!(outputs(output.path()), ["processed_good.png"]);
    }

    #[test]
    fn missing_input_dir_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("out");
        let err = run(&BatchConfig::new(root.path().join("missing"), &output)).unwrap_err();
        assert!(matches!(err, SkinToneError::InvalidDirectory { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn output_dir_is_created() {
        let input = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        write_image(input.path(), "a.bmp");
        let output = root.path().join("nested").join("out");
        let report = run(&BatchConfig::new(input.path(), &output)).unwrap();
        assert_eq!(report.succeeded.len(), 1);
        assert!(output.join("processed_a.bmp").is_file());
    }

    #[test]
    fn output_path_that_is_a_file_is_fatal() {
        let input = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("out");
        fs::write(&output, "").unwrap();
        let err = run(&BatchConfig::new(input.path(), &output)).unwrap_err();
        assert!(matches!(err, SkinToneError::InvalidDirectory { .. }));
    }

    #[test]
    fn enumeration_is_sorted_and_flat() {
        let input = tempfile::tempdir().unwrap();
        write_image(input.path(), "c.png");
        write_image(input.path(), "a.PNG");
        write_image(input.path(), "b.gif");
        fs::create_dir(input.path().join("sub.png")).unwrap();
        write_image(&input.path().join("sub.png"), "nested.png");

        let files = enumerate(input.path()).unwrap();
        let names: Vec<_> = files.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, ["a.PNG", "b.gif", "c.png"]);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_file_names_are_processed() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(b"caf\xe9.png");
        RgbImage::from_pixel(4, 4, Rgb([220, 170, 140])).save(input.path().join(name)).unwrap();

        let report = run(&BatchConfig::new(input.path(), output.path())).unwrap();
        assert_eq!(report.succeeded.len(), 1);
        assert!(report.failed.is_empty());
        let saved = output.path().join(OsStr::from_bytes(b"processed_caf\xe9.png"));
        assert_eq!(helpers::load_image(saved).unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn case_insensitive_collisions_are_reported() {
        let out = Path::new("/out");
        let files = vec![PathBuf::from("/in/A.png"), PathBuf::from("/in/a.png"), PathBuf::from("/in/b.png")];
        let (tasks, rejected) = plan(files, out);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].output, PathBuf::from("/out/processed_A.png"));
        assert_eq!(rejected.len(), 1);
        assert!(matches!(&rejected[0].1, SkinToneError::OutputCollision { other, .. } if other == Path::new("/in/A.png")));
    }

    #[test]
    fn parallel_run_matches_sequential_names() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for name in ["a.png", "b.png", "c.png", "d.tiff"] {
            write_image(input.path(), name);
        }
        let mut config = BatchConfig::new(input.path(), output.path());
        config.jobs = 0;
        let report = run(&config).unwrap();
        assert_eq!(report.succeeded.len(), 4);
        let names: Vec<_> = report.succeeded.iter().map(|f| f.output.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, ["processed_a.png", "processed_b.png", "processed_c.png", "processed_d.tiff"]);
    }

    #[test]
    fn skin_mode_leaves_background_untouched() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let img = RgbImage::from_fn(4, 4, |x, _| if x < 2 { Rgb([200, 100, 100]) } else { Rgb([40, 90, 200]) });
        img.save(input.path().join("mix.png")).unwrap();

        let mut config = BatchConfig::new(input.path(), output.path());
        config.tone = SkinToneConfig::new().with_mask_mode(crate::config::MaskMode::Skin);
        let report = run(&config).unwrap();
        assert_eq!(report.succeeded[0].skin_coverage, 0.5);

        let result = helpers::load_image(output.path().join("processed_mix.png")).unwrap();
        assert_eq!(result.get_pixel(0, 0), &Rgb([210, 88, 88]));
        assert_eq!(result.get_pixel(3, 3), &Rgb([40, 90, 200]));
    }
}
