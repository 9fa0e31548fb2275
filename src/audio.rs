use std::io::Cursor;
use std::time::Duration;

use rodio::{source::SineWave, Decoder, OutputStream, Sink, Source};

const CRY_BASE: &str = "https://raw.githubusercontent.com/PokeAPI/cries/main/cries/pokemon/latest";

pub fn cry_url(id: u32) -> String {
    format!("{CRY_BASE}/{id}.ogg")
}

/// Blocks until playback ends; run it off the async runtime.
pub fn play_ogg(bytes: Vec<u8>) -> Result<(), String> {
    let cursor = Cursor::new(bytes);
    let (_stream, handle) = OutputStream::try_default().map_err(|err| err.to_string())?;
    let sink = Sink::try_new(&handle).map_err(|err| err.to_string())?;
    let source = Decoder::new(cursor).map_err(|err| err.to_string())?;
    sink.set_volume(0.5);
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

pub fn play_hit_tone() {
    std::thread::spawn(|| {
        let Ok((stream, handle)) = OutputStream::try_default() else {
            return;
        };
        let Ok(sink) = Sink::try_new(&handle) else {
            return;
        };
        let source = SineWave::new(220.0)
            .take_duration(Duration::from_millis(90))
            .amplify(0.2);
        sink.append(source);
        sink.sleep_until_end();
        drop(stream);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cry_url_points_at_latest_cries() {
        assert_eq!(
            cry_url(25),
            "https://raw.githubusercontent.com/PokeAPI/cries/main/cries/pokemon/latest/25.ogg"
        );
    }
}
