use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use log::warn;
use rodio::source::{SineWave, Source};
use rodio::{OutputStreamBuilder, Sink};

const BEEP_FREQUENCY_HZ: f32 = 880.0;
const BEEP_BURST: Duration = Duration::from_millis(350);
const BEEP_GAP: Duration = Duration::from_millis(250);
const BEEP_VOLUME: f32 = 0.6;

enum AudioCommand {
    StartLoop,
    Stop,
}

pub struct AudioAlert {
    tx: Option<Sender<AudioCommand>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl AudioAlert {
    pub fn start() -> Self {
        let (tx, rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("mealclock-audio".to_string())
            .spawn(move || run_worker(rx));
        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                warn!("audio thread unavailable, alarm sound disabled: {err}");
                None
            }
        };
        Self {
            tx: Some(tx),
            worker,
        }
    }

    pub fn start_loop(&self) {
        self.send(AudioCommand::StartLoop);
    }

    pub fn stop(&self) {
        self.send(AudioCommand::Stop);
    }

    fn send(&self, command: AudioCommand) {
        if let Some(tx) = &self.tx {
            // a dead worker only means silence
            let _ = tx.send(command);
        }
    }
}

impl Drop for AudioAlert {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

fn run_worker(rx: Receiver<AudioCommand>) {
    let stream = match OutputStreamBuilder::open_default_stream() {
        Ok(stream) => Some(stream),
        Err(err) => {
            warn!("audio output unavailable, alarm sound disabled: {err}");
            None
        }
    };

    let mut playing: Option<Sink> = None;
    while let Ok(command) = rx.recv() {
        match command {
            AudioCommand::StartLoop => {
                if let Some(previous) = playing.take() {
                    previous.stop();
                }
                let Some(stream) = stream.as_ref() else {
                    continue;
                };
                let sink = Sink::connect_new(stream.mixer());
                sink.set_volume(BEEP_VOLUME);
                sink.append(beep_loop());
                sink.play();
                playing = Some(sink);
            }
            AudioCommand::Stop => {
                if let Some(sink) = playing.take() {
                    sink.stop();
                }
            }
        }
    }
}

fn beep_loop() -> impl Source + Send + 'static {
    SineWave::new(BEEP_FREQUENCY_HZ)
        .take_duration(BEEP_BURST)
        .delay(BEEP_GAP)
        .repeat_infinite()
}
