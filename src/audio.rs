//! Audio system using Web Audio API
//!
//! Every cue is a single synthesized sweep; no sound files. Music is three
//! long-running oscillators on their own bus, retuned by the sequencer. If
//! the browser refuses an `AudioContext` the game simply runs silent.

use anyhow::{Result, anyhow};
use web_sys::{
    AudioContext, AudioContextState, AudioNode, BiquadFilterNode, BiquadFilterType, GainNode,
    OscillatorNode, OscillatorType,
};

use crate::music::{MusicStep, Sequencer};
use crate::settings::Settings;
use crate::sim::Cue;

/// One sweep: start/end frequency, peak gain, length
struct Sweep {
    wave: OscillatorType,
    from_hz: f32,
    to_hz: f32,
    /// Seconds to reach `to_hz`
    ramp: f64,
    peak: f32,
    length: f64,
}

fn sweep_for(cue: Cue) -> Sweep {
    match cue {
        // Quick upward chirp
        Cue::Jump => Sweep {
            wave: OscillatorType::Sine,
            from_hz: 400.0,
            to_hz: 600.0,
            ramp: 0.1,
            peak: 0.3,
            length: 0.1,
        },
        Cue::Coin => Sweep {
            wave: OscillatorType::Sine,
            from_hz: 800.0,
            to_hz: 1200.0,
            ramp: 0.05,
            peak: 0.4,
            length: 0.1,
        },
        // Buzzy drop
        Cue::Hit => Sweep {
            wave: OscillatorType::Sawtooth,
            from_hz: 200.0,
            to_hz: 50.0,
            ramp: 0.2,
            peak: 0.5,
            length: 0.2,
        },
        Cue::Wormhole => Sweep {
            wave: OscillatorType::Sine,
            from_hz: 400.0,
            to_hz: 1000.0,
            ramp: 0.3,
            peak: 0.4,
            length: 0.3,
        },
    }
}

/// Background music voices, all routed through `bus`
struct MusicLoop {
    bus: GainNode,
    bass: OscillatorNode,
    pad: OscillatorNode,
    lead: OscillatorNode,
    lead_filter: BiquadFilterNode,
    sequencer: Sequencer,
    /// Audio clock at the previous update
    last_time: Option<f64>,
}

impl MusicLoop {
    fn start(ctx: &AudioContext) -> Result<Self> {
        let bus = ctx.create_gain().map_err(|e| anyhow!("createGain: {:?}", e))?;
        bus.gain().set_value(0.0);
        bus.connect_with_audio_node(&ctx.destination())
            .map_err(|e| anyhow!("connect music bus: {:?}", e))?;

        let (bass, bass_gain) = create_osc(ctx, 55.0, OscillatorType::Sine, &bus)?;
        bass_gain.gain().set_value(0.15);

        let pad_filter = create_lowpass(ctx, 800.0, &bus)?;
        let (pad, pad_gain) = create_osc(ctx, 262.0, OscillatorType::Sawtooth, &pad_filter)?;
        pad_gain.gain().set_value(0.08);

        let lead_filter = create_lowpass(ctx, 1200.0, &bus)?;
        let (lead, lead_gain) = create_osc(ctx, 440.0, OscillatorType::Triangle, &lead_filter)?;
        lead_gain.gain().set_value(0.12);

        for osc in [&bass, &pad, &lead] {
            osc.start().map_err(|e| anyhow!("start: {:?}", e))?;
        }

        Ok(Self {
            bus,
            bass,
            pad,
            lead,
            lead_filter,
            sequencer: Sequencer::new(),
            last_time: None,
        })
    }

    fn update(&mut self, now: f64) {
        let dt = self.last_time.map_or(0.0, |prev| (now - prev) as f32);
        self.last_time = Some(now);
        let MusicStep { chord, note } = self.sequencer.advance(dt);
        if let Some(chord) = chord {
            self.bass.frequency().set_value_at_time(chord.bass_hz, now).ok();
            self.pad.frequency().set_value_at_time(chord.pad_hz, now).ok();
        }
        if let Some(note) = note {
            self.lead.frequency().set_value_at_time(note.lead_hz, now).ok();
            self.lead_filter
                .frequency()
                .set_value_at_time(note.filter_hz, now)
                .ok();
        }
    }

    fn stop(&self) {
        for osc in [&self.bass, &self.pad, &self.lead] {
            let _ = osc.stop();
        }
        let _ = self.bus.disconnect();
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    music: Option<MusicLoop>,
    settings: Settings,
    /// Muted because the window lost focus
    blurred: bool,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        let ctx = match open_context() {
            Ok(ctx) => Some(ctx),
            Err(e) => {
                log::warn!("Audio disabled: {:#}", e);
                None
            }
        };
        Self {
            ctx,
            music: None,
            settings: settings.clone(),
            blurred: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn set_blurred(&mut self, blurred: bool) {
        self.blurred = blurred;
        self.apply_music_level();
    }

    fn sfx_level(&self) -> f32 {
        if self.blurred { 0.0 } else { self.settings.sfx_level() }
    }

    fn music_level(&self) -> f32 {
        if self.blurred { 0.0 } else { self.settings.music_level() }
    }

    fn apply_music_level(&self) {
        if let (Some(ctx), Some(music)) = (&self.ctx, &self.music) {
            let level = self.music_level();
            music.bus.gain().set_value_at_time(level, ctx.current_time()).ok();
        }
    }

    /// Start the background loop; call from a user gesture
    pub fn start_music(&mut self) {
        if self.music.is_some() {
            return;
        }
        let Some(ctx) = &self.ctx else { return };
        match MusicLoop::start(ctx) {
            Ok(music) => {
                self.music = Some(music);
                self.apply_music_level();
                log::info!("Music started");
            }
            Err(e) => log::warn!("Music unavailable: {:#}", e),
        }
    }

    /// Advance the music sequencer against the audio clock
    pub fn update_music(&mut self) {
        let (Some(ctx), Some(music)) = (&self.ctx, self.music.as_mut()) else {
            return;
        };
        music.update(ctx.current_time());
    }

    pub fn stop_music(&mut self) {
        if let Some(music) = self.music.take() {
            music.stop();
        }
    }

    /// Fire and forget
    pub fn play(&self, cue: Cue) {
        let vol = self.sfx_level();
        if vol <= 0.0 {
            return;
        }
        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        if let Err(e) = play_sweep(ctx, &sweep_for(cue), vol) {
            log::debug!("Cue {:?} dropped: {:#}", cue, e);
        }
    }
}

fn open_context() -> Result<AudioContext> {
    AudioContext::new().map_err(|e| anyhow!("AudioContext unavailable: {:?}", e))
}

/// Create an oscillator routed through its own gain node into `out`
fn create_osc(
    ctx: &AudioContext,
    freq: f32,
    wave: OscillatorType,
    out: &AudioNode,
) -> Result<(OscillatorNode, GainNode)> {
    let osc = ctx
        .create_oscillator()
        .map_err(|e| anyhow!("createOscillator: {:?}", e))?;
    let gain = ctx.create_gain().map_err(|e| anyhow!("createGain: {:?}", e))?;

    osc.set_type(wave);
    osc.frequency().set_value(freq);
    osc.connect_with_audio_node(&gain)
        .map_err(|e| anyhow!("connect oscillator: {:?}", e))?;
    gain.connect_with_audio_node(out)
        .map_err(|e| anyhow!("connect gain: {:?}", e))?;

    Ok((osc, gain))
}

fn create_lowpass(ctx: &AudioContext, cutoff: f32, out: &AudioNode) -> Result<BiquadFilterNode> {
    let filter = ctx
        .create_biquad_filter()
        .map_err(|e| anyhow!("createBiquadFilter: {:?}", e))?;
    filter.set_type(BiquadFilterType::Lowpass);
    filter.frequency().set_value(cutoff);
    filter
        .connect_with_audio_node(out)
        .map_err(|e| anyhow!("connect filter: {:?}", e))?;
    Ok(filter)
}

fn play_sweep(ctx: &AudioContext, sweep: &Sweep, vol: f32) -> Result<()> {
    let (osc, gain) = create_osc(ctx, sweep.from_hz, sweep.wave, &ctx.destination())?;
    let t = ctx.current_time();

    gain.gain().set_value_at_time(vol * sweep.peak, t).ok();
    gain.gain()
        .exponential_ramp_to_value_at_time(0.01, t + sweep.length)
        .ok();
    osc.frequency().set_value_at_time(sweep.from_hz, t).ok();
    osc.frequency()
        .exponential_ramp_to_value_at_time(sweep.to_hz, t + sweep.ramp)
        .ok();

    osc.start().map_err(|e| anyhow!("start: {:?}", e))?;
    osc.stop_with_when(t + sweep.length)
        .map_err(|e| anyhow!("stop: {:?}", e))?;
    Ok(())
}
