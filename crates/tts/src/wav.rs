use std::io::Cursor;

/// Sample rate of the PCM requested from the synthesis service
pub const SAMPLE_RATE: u32 = 16_000;

/// Wrap little-endian 16-bit mono PCM in a RIFF/WAVE container
///
/// A trailing odd byte is discarded.
pub fn pcm_to_wav(pcm: &[u8]) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(pcm.len() + 44));

    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;

        for sample in pcm.chunks_exact(2) {
            writer.write_sample(i16::from_le_bytes([sample[0], sample[1]]))?;
        }

        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}
