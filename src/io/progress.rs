use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

/// Pipeline stages, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Separating,
    MixingInstrumental,
    Converting,
    DownloadingConvertedVocal,
    FinalMixing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Separating => "Separating vocals & instrumental",
            Stage::MixingInstrumental => "Mixing instrumental track",
            Stage::Converting => "Converting vocals to the target voice",
            Stage::DownloadingConvertedVocal => "Fetching converted vocals",
            Stage::FinalMixing => "Mixing final track",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoverProgress {
    Stage(Stage),
    Download { file: String, done: u64, total: u64 },
    Finished,
}

type Callback = Box<dyn Fn(CoverProgress) + Send + 'static>;

static PROGRESS_CB: OnceLock<Mutex<Option<Callback>>> = OnceLock::new();

/// Install the process-wide progress listener. Only the first call wins.
pub fn set_progress_callback(cb: impl Fn(CoverProgress) + Send + 'static) {
    let _ = PROGRESS_CB.set(Mutex::new(Some(Box::new(cb))));
}

pub fn emit(progress: CoverProgress) {
    if let Some(m) = PROGRESS_CB.get() {
        if let Ok(g) = m.lock() {
            if let Some(cb) = &*g {
                cb(progress);
            }
        }
    }
}
