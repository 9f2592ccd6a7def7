//! Live capture from the default input device.
//!
//! cpal streams are not `Send`, so each capture owns a thread that builds the
//! stream, forwards callback buffers over a channel and drops the stream when
//! told to stop.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;

use super::{AudioCapture, AudioError, AudioPayload, AudioSource, SampleBuffer};

/// Records from the system's default (or a named) microphone.
#[derive(Debug, Clone, Default)]
pub struct MicrophoneSource {
    device_name: Option<String>,
}

impl MicrophoneSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific input device instead of the system default
    pub fn with_device(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }
}

fn find_device(device_name: Option<&str>) -> Result<cpal::Device, AudioError> {
    let host = cpal::default_host();
    match device_name {
        None => host.default_input_device().ok_or(AudioError::NoInputDevice),
        Some(wanted) => host
            .input_devices()
            .map_err(|e| AudioError::Device(e.to_string()))?
            .find(|device| {
                device
                    .description()
                    .is_ok_and(|desc| desc.to_string() == wanted)
            })
            .ok_or(AudioError::NoInputDevice),
    }
}

impl AudioSource for MicrophoneSource {
    fn open(&self) -> Result<Box<dyn AudioCapture>, AudioError> {
        let (chunk_tx, chunk_rx) = mpsc::channel::<Vec<f32>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<(u32, u16), AudioError>>(1);
        let device_name = self.device_name.clone();

        let handle = std::thread::spawn(move || {
            let started = start_stream(device_name.as_deref(), chunk_tx);
            match started {
                Ok((stream, rate, channels)) => {
                    if ready_tx.send(Ok((rate, channels))).is_err() {
                        return;
                    }
                    // Hold the stream until stop (or the capture is dropped)
                    let _ = stop_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });

        let (sample_rate, channels) = ready_rx
            .recv()
            .map_err(|_| AudioError::Device("capture thread exited".to_string()))??;

        crate::verbose!("Microphone capture started ({sample_rate} Hz, {channels} ch)");

        Ok(Box::new(MicrophoneCapture {
            buffer: SampleBuffer::new(sample_rate, channels),
            chunks: chunk_rx,
            stop: stop_tx,
            thread: Some(handle),
        }))
    }

    fn describe(&self) -> String {
        match &self.device_name {
            Some(name) => format!("microphone '{name}'"),
            None => "default microphone".to_string(),
        }
    }
}

fn start_stream(
    device_name: Option<&str>,
    chunk_tx: Sender<Vec<f32>>,
) -> Result<(cpal::Stream, u32, u16), AudioError> {
    let device = find_device(device_name)?;
    let config = device
        .default_input_config()
        .map_err(|e| AudioError::Device(format!("Failed to get config: {e}")))?;
    let sample_format = config.sample_format();
    let config: cpal::StreamConfig = config.into();
    let sample_rate = config.sample_rate;
    let channels = config.channels;

    let err_fn = |err| crate::verbose!("Audio stream error (non-fatal): {err}");

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let _ = chunk_tx.send(data.to_vec());
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                let chunk = data
                    .iter()
                    .map(|&s| cpal::Sample::from_sample(s))
                    .collect::<Vec<f32>>();
                let _ = chunk_tx.send(chunk);
            },
            err_fn,
            None,
        ),
        other => {
            return Err(AudioError::Device(format!(
                "Unsupported sample format: {other:?}"
            )));
        }
    }
    .map_err(|e| AudioError::Device(format!("Failed to build stream: {e}")))?;

    stream
        .play()
        .map_err(|e| AudioError::Device(format!("Failed to start stream: {e}")))?;

    Ok((stream, sample_rate, channels))
}

struct MicrophoneCapture {
    buffer: SampleBuffer,
    chunks: Receiver<Vec<f32>>,
    stop: Sender<()>,
    thread: Option<JoinHandle<()>>,
}

impl MicrophoneCapture {
    fn shutdown(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl AudioCapture for MicrophoneCapture {
    fn finish(mut self: Box<Self>) -> Result<AudioPayload, AudioError> {
        self.shutdown();
        while let Ok(chunk) = self.chunks.try_recv() {
            self.buffer.push(chunk);
        }
        let buffer = std::mem::replace(&mut self.buffer, SampleBuffer::new(1, 1));
        buffer.assemble()
    }
}

impl Drop for MicrophoneCapture {
    fn drop(&mut self) {
        self.shutdown();
    }
}
