//! Audio system using Web Audio API
//!
//! Every cue is synthesized from a couple of oscillators, so the host page
//! needs no sound files. The simulation only emits `SoundCue`s; this is the
//! one place they turn into noise.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::SoundCue;

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    settings: Settings,
    /// Muted because the page lost focus (separate from the player's mute)
    blurred: bool,
}

impl AudioManager {
    pub fn new(settings: Settings) -> Self {
        // May fail outside a secure context
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            settings,
            blurred: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings.clamped();
    }

    /// Track window focus; only silences output if the player asked for it
    pub fn set_blurred(&mut self, blurred: bool) {
        self.blurred = blurred && self.settings.mute_on_blur;
    }

    fn effective_volume(&self) -> f32 {
        if self.blurred {
            0.0
        } else {
            self.settings.effective_volume()
        }
    }

    /// Play a cue at its own gain scaled by the player's volume
    pub fn play(&self, cue: SoundCue) {
        let vol = self.effective_volume() * cue.gain();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Browsers keep the context suspended until a user gesture
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Shot => self.play_shot(ctx, vol),
            SoundCue::Bullet => self.play_bullet(ctx, vol),
            SoundCue::BulletSmall => self.play_bullet_small(ctx, vol),
            SoundCue::Hit => self.play_hit(ctx, vol),
            SoundCue::Explode => self.play_explode(ctx, vol),
            SoundCue::ShotHit => self.play_shot_hit(ctx, vol),
            SoundCue::Graze => self.play_graze(ctx, vol),
            SoundCue::Power => self.play_power(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Single decaying blip with an optional pitch sweep
    fn blip(
        &self,
        ctx: &AudioContext,
        osc_type: OscillatorType,
        (from, to): (f32, f32),
        peak: f32,
        length: f64,
    ) {
        let Some((osc, gain)) = self.create_osc(ctx, from, osc_type) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(peak, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + length)
            .ok();
        if from != to {
            osc.frequency().set_value_at_time(from, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(to, t + length)
                .ok();
        }

        osc.start().ok();
        osc.stop_with_when(t + length + 0.05).ok();
    }

    /// Player spread - short bright chirp
    fn play_shot(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, OscillatorType::Square, (900.0, 600.0), vol * 0.12, 0.05);
    }

    /// Enemy volley - low pulse
    fn play_bullet(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, OscillatorType::Triangle, (320.0, 180.0), vol * 0.25, 0.1);
    }

    /// Ring or boss volley - lighter pulse
    fn play_bullet_small(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, OscillatorType::Triangle, (520.0, 380.0), vol * 0.18, 0.06);
    }

    /// Ship hit - harsh falling buzz
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.3)
                .ok();
            osc.frequency().set_value_at_time(220.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(55.0, t + 0.3)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.35).ok();
        }

        // Sub thump
        if let Some((osc, gain)) = self.create_osc(ctx, 50.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }
    }

    /// Enemy destroyed - boom
    fn play_explode(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, OscillatorType::Sawtooth, (100.0, 30.0), vol * 0.5, 0.4);

        // High frequency crack
        let t = ctx.current_time();
        if let Some((osc, gain)) = self.create_osc(ctx, 1500.0, OscillatorType::Square) {
            gain.gain().set_value_at_time(vol * 0.2, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.1)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.15).ok();
        }
    }

    /// Shot connects - soft tap
    fn play_shot_hit(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, OscillatorType::Triangle, (300.0, 300.0), vol * 0.25, 0.05);
    }

    /// Graze - airy tick
    fn play_graze(&self, ctx: &AudioContext, vol: f32) {
        self.blip(ctx, OscillatorType::Sine, (2400.0, 3200.0), vol * 0.15, 0.04);
    }

    /// Meter charged - rising arpeggio
    fn play_power(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [600.0, 800.0, 1000.0, 1200.0].iter().enumerate() {
            let delay = i as f64 * 0.06;
            if let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Sine) {
                let t = ctx.current_time() + delay;
                gain.gain().set_value_at_time(vol * 0.25, t).ok();
                gain.gain()
                    .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                    .ok();
                osc.start_with_when(t).ok();
                osc.stop_with_when(t + 0.2).ok();
            }
        }
    }
}
