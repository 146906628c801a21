//! Decoding of buffered tracks into 16-bit PCM.
//!
//! [`PcmDecoder`] probes the container (MP3 is the common case; anything the
//! symphonia registry knows also works), picks the first decodable track and
//! yields interleaved `i16` chunks one packet at a time.

use std::io::{self, Cursor};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{AudioError, Result};

/// A block of interleaved signed 16-bit samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmChunk {
    /// Number of interleaved channels.
    pub channels: u16,
    /// Frames per second.
    pub sample_rate: u32,
    /// Interleaved samples (`frames * channels` values).
    pub samples: Vec<i16>,
}

impl PcmChunk {
    /// Number of sample frames in the chunk.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / usize::from(self.channels)
    }
}

/// Packet-by-packet decoder over an in-memory track.
pub struct PcmDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
}

impl std::fmt::Debug for PcmDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PcmDecoder")
            .field("track_id", &self.track_id)
            .finish_non_exhaustive()
    }
}

impl PcmDecoder {
    /// Probe `data` and prepare a decoder for its first audio track.
    ///
    /// `extension` (e.g. `"mp3"`) speeds up probing but is not required.
    ///
    /// # Errors
    ///
    /// Returns [`AudioError::Format`] if the container is not recognized and
    /// [`AudioError::NoAudioTrack`] if it holds nothing decodable.
    pub fn new(data: Vec<u8>, extension: Option<&str>) -> Result<Self> {
        let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = extension {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe().format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )?;
        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or(AudioError::NoAudioTrack)?;
        let track_id = track.id;
        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;

        Ok(Self {
            format,
            decoder,
            track_id,
        })
    }

    /// Decode the next packet.
    ///
    /// Returns `Ok(None)` at the end of the stream. Corrupt packets are
    /// skipped.
    pub fn next_chunk(&mut self) -> Result<Option<PcmChunk>> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    return Ok(None);
                }
                Err(SymphoniaError::ResetRequired) => return Ok(None),
                Err(e) => return Err(e.into()),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let spec = *decoded.spec();
                    if decoded.frames() == 0 {
                        continue;
                    }
                    let mut buf = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
                    buf.copy_interleaved_ref(decoded);
                    return Ok(Some(PcmChunk {
                        channels: spec.channels.count() as u16,
                        sample_rate: spec.rate,
                        samples: buf.samples().to_vec(),
                    }));
                }
                Err(SymphoniaError::DecodeError(msg)) => {
                    tracing::warn!(msg, "skipping corrupt packet");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// File extension of a playlist entry, used as a probe hint.
pub fn extension_hint(entry: &str) -> Option<&str> {
    let name = entry.rsplit('/').next().unwrap_or(entry);
    let name = name.split(['?', '#']).next().unwrap_or(name);
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::wav_bytes;
    use pretty_assertions::assert_eq;

    fn decode_all(mut decoder: PcmDecoder) -> (Vec<i16>, u32, u16) {
        let mut samples = Vec::new();
        let mut rate = 0;
        let mut channels = 0;
        while let Some(chunk) = decoder.next_chunk().unwrap() {
            rate = chunk.sample_rate;
            channels = chunk.channels;
            samples.extend_from_slice(&chunk.samples);
        }
        (samples, rate, channels)
    }

    #[test]
    fn decodes_wav_samples_exactly() {
        let input: Vec<i16> = (0..2000).map(|i| ((i % 200) * 100 - 10_000) as i16).collect();
        let decoder = PcmDecoder::new(wav_bytes(&input, 8_000, 2), Some("wav")).unwrap();
        let (samples, rate, channels) = decode_all(decoder);
        assert_eq!(rate, 8_000);
        assert_eq!(channels, 2);
        assert_eq!(samples, input);
    }

    #[test]
    fn probes_without_hint() {
        let input = vec![7i16; 64];
        let decoder = PcmDecoder::new(wav_bytes(&input, 44_100, 1), None).unwrap();
        let (samples, _, channels) = decode_all(decoder);
        assert_eq!(channels, 1);
        assert_eq!(samples, input);
    }

    #[test]
    fn garbage_is_rejected() {
        let err = PcmDecoder::new(b"definitely not audio".to_vec(), Some("mp3")).unwrap_err();
        assert!(matches!(err, AudioError::Format(_)), "got: {err:?}");
    }

    #[test]
    fn chunk_frames() {
        let chunk = PcmChunk {
            channels: 2,
            sample_rate: 44_100,
            samples: vec![0; 10],
        };
        assert_eq!(chunk.frames(), 5);
    }

    #[test]
    fn extension_hint_from_entry() {
        assert_eq!(extension_hint("http://h/a/song.mp3?x=1"), Some("mp3"));
        assert_eq!(extension_hint("/music/track.flac"), Some("flac"));
        assert_eq!(extension_hint("noext"), None);
        assert_eq!(extension_hint("dir.v2/noext"), None);
    }
}
