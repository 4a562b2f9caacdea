use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    thread,
};

use chrono::{format::DelayedFormat, DateTime, Local};
use crossbeam_channel::{unbounded, Receiver, Sender};
use log::Level;
use once_cell::sync::Lazy;

/// 日誌目錄
const LOG_DIR: &str = "log";
/// 累積到這個大小就先寫入檔案
const BATCH_SIZE: usize = 4096;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// A named file logger.
///
/// Callers never block on disk I/O: messages go over a channel to a dedicated
/// thread which batches them and appends to `log/{name}_{yyyy-mm-dd}.log`.
pub struct Logger {
    writer: Sender<LogMessage>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        let (tx, rx) = unbounded::<LogMessage>();
        let name = log_name.to_string();

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || write_loop(&name, rx));

        Logger { writer: tx }
    }

    pub fn debug(&self, log: String) {
        self.send(Level::Debug, log);
    }

    pub fn info(&self, log: String) {
        self.send(Level::Info, log);
    }

    pub fn warn(&self, log: String) {
        self.send(Level::Warn, log);
    }

    pub fn error(&self, log: String) {
        self.send(Level::Error, log);
    }

    fn send(&self, level: Level, msg: String) {
        if let Err(why) = self.writer.send(LogMessage::new(level, msg)) {
            error_console(why.to_string());
        }
    }
}

pub struct LogMessage {
    pub level: Level,
    pub msg: String,
    pub created_at: DateTime<Local>,
}

impl LogMessage {
    pub fn new(level: Level, msg: String) -> Self {
        LogMessage {
            level,
            msg,
            created_at: Local::now(),
        }
    }
}

fn write_loop(name: &str, rx: Receiver<LogMessage>) {
    let mut lines = String::with_capacity(BATCH_SIZE);
    let mut day = String::new();

    while let Ok(received) = rx.recv() {
        let received_day = received.created_at.format("%Y-%m-%d").to_string();
        // 跨日時先把前一天的內容寫進前一天的檔案
        if received_day != day {
            flush(name, &day, &mut lines);
            day = received_day;
        }

        push_line(&mut lines, &received);

        if rx.is_empty() || lines.len() >= BATCH_SIZE {
            flush(name, &day, &mut lines);
        }
    }

    flush(name, &day, &mut lines);
}

fn flush(name: &str, day: &str, lines: &mut String) {
    if lines.is_empty() {
        return;
    }

    if let Err(why) = append(&log_path(name, day), lines) {
        error_console(format!("Failed to write log file because {:?}", why));
        info_console(lines.clone());
    }

    lines.clear();
}

fn push_line(lines: &mut String, message: &LogMessage) {
    if writeln!(
        lines,
        "{} {} {}",
        message.created_at.format("%F %X%.6f"),
        message.level,
        message.msg
    )
    .is_err()
    {
        info_console(message.msg.clone());
    }
}

fn append(path: &Path, lines: &str) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(lines.as_bytes())?;
    writer.flush()
}

fn log_path(name: &str, day: &str) -> PathBuf {
    let mut path = PathBuf::from(LOG_DIR);
    path.push(format!("{}_{}.log", name, day));
    path
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: String) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    eprintln!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}
