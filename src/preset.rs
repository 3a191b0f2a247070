//! Line-oriented emitter presets.
//!
//! One emitter per line, every field terminated by `|`:
//!
//! ```text
//! enabled | direction | velocity | direction angle | velocity angle | offset |
//! origin acceleration | burst | capacity | origin | external acceleration |
//! base scale | scale increase | start color | end color | life time |
//! base rotation | rotation speed | texture origin | texture path
//! ```
//!
//! Ranges and vectors are written as `a,b` with three decimals, colors as
//! `r,g,b,a` bytes. Lines starting with `#` are comments.

use std::{fmt, fs, path::Path, str::FromStr};

use glam::Vec2;
use log::info;

use crate::{
    emitter::{Emitter, EmitterConfig},
    error::{Error, Result},
    math::{Color, FloatRange, IntRange},
};

pub const HEADER: &str = "# is active | direction | velocity | direction angle | velocity angle | offset | \
origin acceleration | burst | capacity | origin | external acceleration | base scale | scale increase | \
start color | end color | life time | base rotation | rotation speed | texture origin | texture path";

/// Persisted state of one emitter.
///
/// Emission rate, blend mode, texture handle and deactivation rule are not part
/// of the format.
#[derive(Debug, Clone)]
pub struct EmitterPreset {
    pub enabled: bool,
    pub config: EmitterConfig,
    pub texture_path: String,
}

impl EmitterPreset {
    /// Snapshots `emitter`. The capacity is taken from its pool.
    pub fn from_emitter(emitter: &Emitter, texture_path: impl Into<String>) -> Self {
        let config = EmitterConfig {
            capacity: emitter.capacity(),
            ..emitter.config().clone()
        };
        Self {
            enabled: emitter.is_emitting(),
            config,
            texture_path: texture_path.into(),
        }
    }

    pub fn build_emitter(&self) -> Result<Emitter> {
        let mut emitter = Emitter::new(self.config.clone())?;
        if self.enabled {
            emitter.start();
        }
        Ok(emitter)
    }

    /// Reinitializes `emitter` from the preset, keeping the fields the format
    /// does not carry.
    pub fn apply(&self, emitter: &mut Emitter) -> Result<()> {
        let current = emitter.config();
        let config = EmitterConfig {
            emission_rate: current.emission_rate,
            blend_mode: current.blend_mode,
            texture: current.texture,
            deactivation_rule: current.deactivation_rule.clone(),
            ..self.config.clone()
        };
        emitter.reinit(config)?;

        if self.enabled {
            emitter.start();
        } else {
            emitter.stop();
        }

        Ok(())
    }

    /// Parses one non-comment line. `line` is only used in error messages.
    pub fn parse_line(text: &str, line: usize) -> Result<Self> {
        let mut fields = Fields::new(text, line);

        let enabled = fields.parse::<i32>("is active")? != 0;
        let mut config = EmitterConfig {
            direction: fields.vec2("direction")?,
            velocity: fields.float_range("velocity")?,
            direction_angle: fields.float_range("direction angle")?,
            velocity_angle: fields.float_range("velocity angle")?,
            offset: fields.float_range("offset")?,
            origin_acceleration: fields.float_range("origin acceleration")?,
            ..Default::default()
        };
        config.burst = fields.int_range("burst")?;
        config.capacity = fields.parse("capacity")?;
        config.origin = fields.vec2("origin")?;
        config.external_acceleration = fields.vec2("external acceleration")?;
        config.base_scale = fields.vec2("base scale")?;
        config.scale_increase = fields.vec2("scale increase")?;
        config.start_color = fields.color("start color")?;
        config.end_color = fields.color("end color")?;
        config.age = fields.float_range("life time")?;
        config.base_rotation = fields.parse("base rotation")?;
        config.rotation_speed = fields.float_range("rotation speed")?;
        config.texture_origin = fields.vec2("texture origin")?;
        let texture_path = fields.next("texture path")?.to_owned();

        Ok(Self {
            enabled,
            config,
            texture_path,
        })
    }
}

impl fmt::Display for EmitterPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.config;
        write!(f, "{}|", self.enabled as i32)?;
        write_vec2(f, c.direction)?;
        write_range(f, c.velocity)?;
        write_range(f, c.direction_angle)?;
        write_range(f, c.velocity_angle)?;
        write_range(f, c.offset)?;
        write_range(f, c.origin_acceleration)?;
        write!(f, "{},{}|", c.burst.min, c.burst.max)?;
        write!(f, "{}|", c.capacity)?;
        write_vec2(f, c.origin)?;
        write_vec2(f, c.external_acceleration)?;
        write_vec2(f, c.base_scale)?;
        write_vec2(f, c.scale_increase)?;
        write_color(f, c.start_color)?;
        write_color(f, c.end_color)?;
        write_range(f, c.age)?;
        write!(f, "{:.6}|", c.base_rotation)?;
        write_range(f, c.rotation_speed)?;
        write_vec2(f, c.texture_origin)?;
        write!(f, "{}|", self.texture_path)
    }
}

fn write_range(f: &mut fmt::Formatter<'_>, range: FloatRange) -> fmt::Result {
    write!(f, "{:.3},{:.3}|", range.min, range.max)
}

fn write_vec2(f: &mut fmt::Formatter<'_>, v: Vec2) -> fmt::Result {
    write!(f, "{:.3},{:.3}|", v.x, v.y)
}

fn write_color(f: &mut fmt::Formatter<'_>, c: Color) -> fmt::Result {
    write!(f, "{},{},{},{}|", c.r, c.g, c.b, c.a)
}

/// Cursor over the `|`-separated fields of one line.
struct Fields<'a> {
    tokens: std::str::Split<'a, char>,
    line: usize,
}

impl<'a> Fields<'a> {
    fn new(text: &'a str, line: usize) -> Self {
        Self {
            tokens: text.trim_end_matches(|c: char| c == '\r' || c == '\n').split('|'),
            line,
        }
    }

    fn error(&self, name: &str, message: impl fmt::Display) -> Error {
        Error::Parse {
            line: self.line,
            message: format!("{}: {}", name, message),
        }
    }

    fn next(&mut self, name: &str) -> Result<&'a str> {
        self.tokens
            .next()
            .map(str::trim)
            .ok_or_else(|| self.error(name, "missing field"))
    }

    fn scalar<T>(&self, name: &str, token: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        token
            .parse()
            .map_err(|e| self.error(name, format!("{:?}: {}", token, e)))
    }

    fn parse<T>(&mut self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let token = self.next(name)?;
        self.scalar(name, token)
    }

    fn list<T, const N: usize>(&mut self, name: &str) -> Result<[T; N]>
    where
        T: FromStr + Copy + Default,
        T::Err: fmt::Display,
    {
        let token = self.next(name)?;
        let mut values = [T::default(); N];
        let mut parts = token.split(',');
        for value in values.iter_mut() {
            let part = parts
                .next()
                .ok_or_else(|| self.error(name, format!("expected {} values", N)))?;
            *value = self.scalar(name, part.trim())?;
        }
        if parts.next().is_some() {
            return Err(self.error(name, format!("expected {} values", N)));
        }
        Ok(values)
    }

    fn float_range(&mut self, name: &str) -> Result<FloatRange> {
        let [min, max] = self.list(name)?;
        Ok(FloatRange::new(min, max))
    }

    fn int_range(&mut self, name: &str) -> Result<IntRange> {
        let [min, max] = self.list(name)?;
        Ok(IntRange::new(min, max))
    }

    fn vec2(&mut self, name: &str) -> Result<Vec2> {
        let [x, y] = self.list(name)?;
        Ok(Vec2::new(x, y))
    }

    fn color(&mut self, name: &str) -> Result<Color> {
        let [r, g, b, a] = self.list(name)?;
        Ok(Color::rgba(r, g, b, a))
    }
}

/// A whole preset file: one [`EmitterPreset`] per non-comment line.
#[derive(Debug, Clone, Default)]
pub struct PresetFile {
    pub emitters: Vec<EmitterPreset>,
}

impl PresetFile {
    pub fn parse(text: &str) -> Result<Self> {
        let emitters = text
            .lines()
            .enumerate()
            .filter(|(_, line)| {
                let line = line.trim();
                !line.is_empty() && !line.starts_with('#')
            })
            .map(|(index, line)| EmitterPreset::parse_line(line, index + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { emitters })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = Self::parse(&fs::read_to_string(path)?)?;
        info!(
            "Loaded {} emitter presets from {}",
            file.emitters.len(),
            path.display()
        );
        Ok(file)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_string())?;
        info!(
            "Saved {} emitter presets to {}",
            self.emitters.len(),
            path.display()
        );
        Ok(())
    }
}

impl fmt::Display for PresetFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", HEADER)?;
        for emitter in &self.emitters {
            writeln!(f, "{}", emitter)?;
        }
        Ok(())
    }
}
