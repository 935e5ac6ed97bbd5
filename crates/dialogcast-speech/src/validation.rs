//! Lightweight sniffing of compressed audio buffers by their leading bytes.

/// Container recognised from a buffer's magic number.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioContainer {
    /// MP3 preceded by an ID3v2 tag
    Mp3Id3,
    /// Bare MPEG audio frame (frame-sync marker)
    Mp3Frame,
    Wav,
    Ogg,
    Unknown,
}

impl AudioContainer {
    pub fn is_mp3(&self) -> bool {
        matches!(self, AudioContainer::Mp3Id3 | AudioContainer::Mp3Frame)
    }
}

/// Inspects the leading bytes of `bytes`.
pub fn sniff(bytes: &[u8]) -> AudioContainer {
    match bytes {
        [b'I', b'D', b'3', ..] => AudioContainer::Mp3Id3,
        // 11 set sync bits: 0xFF then the top three bits of the next byte.
        [0xFF, second, ..] if second & 0xE0 == 0xE0 => AudioContainer::Mp3Frame,
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => AudioContainer::Wav,
        [b'O', b'g', b'g', b'S', ..] => AudioContainer::Ogg,
        _ => AudioContainer::Unknown,
    }
}

/// True when the buffer starts like an MP3 stream.
pub fn is_valid_mp3(bytes: &[u8]) -> bool {
    sniff(bytes).is_mp3()
}
