//! Storyboard script parser.
//!
//! The script is scanned line by line. A non-indented `Sprite`/`Animation`
//! line opens an object; indented lines (leading spaces or underscores)
//! accumulate under it until the next non-indented line. Each object is then
//! finalized on its own: header fields, then its command block, whose loop
//! and trigger groups are resolved from the indentation depth.
//!
//! ```text
//! [Events]
//! Sprite,Foreground,Centre,"sb/star.png",320,240
//!  F,0,1000,2000,0,1
//!  L,2000,4
//!   R,0,0,500,0,3.1415
//! ```
//!
//! Errors never abort the scan: a bad header or a bad nesting drops the
//! object, a bad command drops that command.

use std::borrow::Cow;
use std::path::Path;

use log::{debug, info, warn};
use raylib::prelude::Vector2;
use rustc_hash::FxHashMap;

use super::command::{Command, Parameter, PropertyCommands, Rgb};
use super::easing::Easing;
use super::error::StoryboardError;
use super::sprite::{CommandSet, Frames, LoopType, Origin, Sprite, TriggerGroup, ZIndex};
use super::texturecache::{TextureCache, TextureLoader};
use super::timeline::Repeat;
use super::{Layer, Storyboard};

const DEFAULT_IMAGE_EXTENSION: &str = ".png";

/// Parse `text` into a storyboard, resolving images relative to `base_dir`.
pub fn parse_script(text: &str, base_dir: &Path, loader: &mut dyn TextureLoader) -> Storyboard {
    let mut builder = StoryboardBuilder::new(base_dir, loader);
    let mut section = Section::Events;
    let mut variables = Variables::default();
    let mut current: Option<PendingObject> = None;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let raw = raw.trim_end();
        let trimmed = raw.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if trimmed.starts_with('[') && trimmed.ends_with(']') {
            if let Some(obj) = current.take() {
                builder.add_object(obj);
            }
            section = Section::from_name(&trimmed[1..trimmed.len() - 1]);
            continue;
        }

        match section {
            Section::Variables => variables.define(line_no, trimmed),
            Section::Other => {}
            Section::Events => {
                let line = variables.substitute(raw);
                if line.starts_with(' ') || line.starts_with('_') {
                    match current.as_mut() {
                        Some(obj) => obj.commands.push((line_no, line.into_owned())),
                        None => debug!("line {}: command outside of an object ignored", line_no),
                    }
                    continue;
                }
                if let Some(obj) = current.take() {
                    builder.add_object(obj);
                }
                match ObjectKind::from_header(&line) {
                    Some(kind) => {
                        current = Some(PendingObject {
                            kind,
                            line: line_no,
                            header: line.into_owned(),
                            commands: Vec::new(),
                        })
                    }
                    None => debug!("line {}: unsupported event ignored", line_no),
                }
            }
        }
    }
    if let Some(obj) = current.take() {
        builder.add_object(obj);
    }

    builder.build()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    Events,
    Variables,
    Other,
}

impl Section {
    fn from_name(name: &str) -> Self {
        match name.trim() {
            "Events" => Section::Events,
            "Variables" => Section::Variables,
            _ => Section::Other,
        }
    }
}

/// `$name=value` definitions, substituted longest name first.
#[derive(Debug, Default)]
struct Variables {
    values: FxHashMap<String, String>,
    by_length: Vec<String>,
}

impl Variables {
    fn define(&mut self, line_no: usize, line: &str) {
        let Some((name, value)) = line.split_once('=') else {
            debug!("line {}: variable definition without '=' ignored", line_no);
            return;
        };
        let name = name.trim();
        if !name.starts_with('$') || name.len() < 2 {
            debug!("line {}: variable name must start with '$'", line_no);
            return;
        }
        if self
            .values
            .insert(name.to_string(), value.trim().to_string())
            .is_none()
        {
            self.by_length.push(name.to_string());
            self.by_length.sort_by(|a, b| b.len().cmp(&a.len()));
        }
    }

    fn substitute<'a>(&self, line: &'a str) -> Cow<'a, str> {
        if self.values.is_empty() || !line.contains('$') {
            return Cow::Borrowed(line);
        }
        let mut out = line.to_string();
        for name in &self.by_length {
            if out.contains(name.as_str()) {
                out = out.replace(name.as_str(), &self.values[name]);
            }
        }
        Cow::Owned(out)
    }
}

/// Object header kinds, decided from the first field of a header line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ObjectKind {
    Sprite,
    Animation,
}

impl ObjectKind {
    pub fn from_header(line: &str) -> Option<ObjectKind> {
        match line.split(',').next().map(str::trim) {
            Some("Sprite") | Some("4") => Some(ObjectKind::Sprite),
            Some("Animation") | Some("6") => Some(ObjectKind::Animation),
            _ => None,
        }
    }

    fn min_fields(self) -> usize {
        match self {
            ObjectKind::Sprite => 6,
            ObjectKind::Animation => 8,
        }
    }
}

struct PendingObject {
    kind: ObjectKind,
    line: usize,
    header: String,
    commands: Vec<(usize, String)>,
}

#[derive(Debug, Clone, PartialEq)]
struct Animation {
    frame_count: u32,
    frame_delay: f64,
    loop_type: LoopType,
}

/// Parsed object header line.
#[derive(Debug, Clone, PartialEq)]
struct ObjectHeader {
    /// `None` for layers that are parsed but not rendered.
    layer: Option<Layer>,
    layer_token: String,
    origin: Origin,
    image: String,
    position: Vector2,
    animation: Option<Animation>,
}

impl ObjectHeader {
    fn parse(kind: ObjectKind, line_no: usize, line: &str) -> Result<Self, StoryboardError> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < kind.min_fields() {
            return Err(StoryboardError::malformed(
                line_no,
                format!(
                    "{:?} header needs {} fields, found {}",
                    kind,
                    kind.min_fields(),
                    fields.len()
                ),
            ));
        }

        let origin = Origin::from_token(fields[2]).unwrap_or_else(|| {
            debug!("line {}: unknown origin {:?}, using TopLeft", line_no, fields[2]);
            Origin::TopLeft
        });
        let image = fields[3].trim_matches('"').replace('\\', "/");
        if image.is_empty() {
            return Err(StoryboardError::malformed(line_no, "empty image path"));
        }
        let position = Vector2 {
            x: parse_number(fields[4], "x", line_no, malformed)?,
            y: parse_number(fields[5], "y", line_no, malformed)?,
        };

        let animation = match kind {
            ObjectKind::Sprite => None,
            ObjectKind::Animation => {
                let frame_count: u32 =
                    parse_number(fields[6], "frame count", line_no, malformed)?;
                if frame_count == 0 {
                    return Err(StoryboardError::malformed(line_no, "animation without frames"));
                }
                let frame_delay: f64 =
                    parse_number(fields[7], "frame delay", line_no, malformed)?;
                let loop_type = fields
                    .get(8)
                    .and_then(|t| LoopType::from_token(t))
                    .unwrap_or_default();
                Some(Animation {
                    frame_count,
                    frame_delay,
                    loop_type,
                })
            }
        };

        Ok(ObjectHeader {
            layer: Layer::from_token(fields[1]),
            layer_token: fields[1].to_string(),
            origin,
            image,
            position,
            animation,
        })
    }

    /// Image path of every frame, relative to the script directory.
    fn frame_paths(&self) -> Vec<String> {
        let (base, ext) = split_extension(&self.image);
        let ext = if ext.is_empty() {
            DEFAULT_IMAGE_EXTENSION
        } else {
            ext
        };
        match &self.animation {
            None => vec![format!("{base}{ext}")],
            Some(anim) => (0..anim.frame_count)
                .map(|i| format!("{base}{i}{ext}"))
                .collect(),
        }
    }
}

/// Split `dir/name.ext` into `("dir/name", ".ext")`.
fn split_extension(image: &str) -> (&str, &str) {
    let name_start = image.rfind('/').map_or(0, |i| i + 1);
    match image[name_start..].rfind('.') {
        Some(dot) if dot > 0 => image.split_at(name_start + dot),
        _ => (image, ""),
    }
}

fn parse_number<T: std::str::FromStr>(
    field: &str,
    what: &str,
    line_no: usize,
    make_err: fn(usize, String) -> StoryboardError,
) -> Result<T, StoryboardError> {
    field
        .trim()
        .parse()
        .map_err(|_| make_err(line_no, format!("invalid {what} {field:?}")))
}

/// One parsed command line.
#[derive(Debug, Clone, PartialEq)]
enum CommandLine {
    Property(PropertyCommands),
    Loop {
        start: f64,
        iterations: Option<u32>,
    },
    Trigger {
        trigger: String,
        start: f64,
        end: f64,
        group: i32,
    },
}

fn malformed(line_no: usize, reason: String) -> StoryboardError {
    StoryboardError::malformed(line_no, reason)
}

fn corrupt(line_no: usize, reason: String) -> StoryboardError {
    StoryboardError::corrupt(line_no, reason)
}

fn parse_command_line(line_no: usize, body: &str) -> Result<CommandLine, StoryboardError> {
    let mut fields: Vec<&str> = body.split(',').map(str::trim).collect();
    while fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }
    let need = |n: usize| {
        if fields.len() < n {
            Err(corrupt(
                line_no,
                format!("{} needs {} fields, found {}", fields[0], n, fields.len()),
            ))
        } else {
            Ok(())
        }
    };

    match fields[0] {
        "L" => {
            need(3)?;
            let start = parse_number(fields[1], "loop start", line_no, corrupt)?;
            let count: i64 = parse_number(fields[2], "loop count", line_no, corrupt)?;
            let iterations = (count > 0).then(|| count.min(u32::MAX as i64) as u32);
            Ok(CommandLine::Loop { start, iterations })
        }
        "T" => {
            need(4)?;
            let start = parse_number(fields[2], "trigger start", line_no, corrupt)?;
            let end = if fields[3].is_empty() {
                start
            } else {
                parse_number(fields[3], "trigger end", line_no, corrupt)?
            };
            let group = match fields.get(4) {
                Some(g) => parse_number(g, "trigger group", line_no, corrupt)?,
                None => 0,
            };
            Ok(CommandLine::Trigger {
                trigger: fields[1].to_string(),
                start,
                end,
                group,
            })
        }
        kind => {
            need(5)?;
            let easing_id: u32 = parse_number(fields[1], "easing", line_no, corrupt)?;
            let easing = Easing::from_id(easing_id)
                .ok_or_else(|| corrupt(line_no, format!("unknown easing {easing_id}")))?;
            let start: f64 = parse_number(fields[2], "start time", line_no, corrupt)?;
            let end: f64 = if fields[3].is_empty() {
                start
            } else {
                parse_number(fields[3], "end time", line_no, corrupt)?
            };
            let timing = Timing {
                easing,
                start,
                end,
                line_no,
            };
            let values = &fields[4..];
            let commands = match kind {
                "F" => PropertyCommands::Fade(timing.segments(values, 1, |v| v[0])?),
                "S" => PropertyCommands::Scale(timing.segments(values, 1, |v| v[0])?),
                "R" => PropertyCommands::Rotate(timing.segments(values, 1, |v| v[0])?),
                "MX" => PropertyCommands::MoveX(timing.segments(values, 1, |v| v[0])?),
                "MY" => PropertyCommands::MoveY(timing.segments(values, 1, |v| v[0])?),
                "M" => PropertyCommands::Move(
                    timing.segments(values, 2, |v| Vector2 { x: v[0], y: v[1] })?,
                ),
                "V" => PropertyCommands::VectorScale(
                    timing.segments(values, 2, |v| Vector2 { x: v[0], y: v[1] })?,
                ),
                "C" => PropertyCommands::Color(
                    timing.segments(values, 3, |v| Rgb::new(v[0], v[1], v[2]))?,
                ),
                "P" => {
                    let param = Parameter::from_token(values[0]).ok_or_else(|| {
                        corrupt(line_no, format!("unknown parameter {:?}", values[0]))
                    })?;
                    PropertyCommands::Parameter(
                        param,
                        Command::new(easing, start, end, true, true),
                    )
                }
                other => return Err(corrupt(line_no, format!("unknown command {other:?}"))),
            };
            Ok(CommandLine::Property(commands))
        }
    }
}

struct Timing {
    easing: Easing,
    start: f64,
    end: f64,
    line_no: usize,
}

impl Timing {
    /// Build the command chain for `values`, `arity` numbers per keyframe.
    ///
    /// One keyframe holds its value over the interval; each further keyframe
    /// adds a segment of the same duration right after the previous one.
    fn segments<T>(
        &self,
        values: &[&str],
        arity: usize,
        make: impl Fn(&[f32]) -> T,
    ) -> Result<Vec<Command<T>>, StoryboardError>
    where
        T: super::command::Interpolate,
    {
        if values.is_empty() || values.len() % arity != 0 {
            return Err(corrupt(
                self.line_no,
                format!("expected a multiple of {arity} values, found {}", values.len()),
            ));
        }
        let numbers = values
            .iter()
            .map(|v| parse_number::<f32>(v, "value", self.line_no, corrupt))
            .collect::<Result<Vec<_>, _>>()?;
        let keyframes: Vec<T> = numbers.chunks(arity).map(make).collect();
        if keyframes.len() == 1 {
            return Ok(vec![Command::new(
                self.easing,
                self.start,
                self.end,
                keyframes[0],
                keyframes[0],
            )]);
        }
        let duration = (self.end - self.start).max(0.0);
        Ok(keyframes
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let shift = i as f64 * duration;
                Command::new(
                    self.easing,
                    self.start + shift,
                    self.end.max(self.start) + shift,
                    pair[0],
                    pair[1],
                )
            })
            .collect())
    }
}

enum OpenGroup {
    None,
    Loop {
        line_no: usize,
        start: f64,
        iterations: Option<u32>,
        body: Vec<PropertyCommands>,
    },
    Trigger(TriggerGroup),
    /// Children of a corrupt group opener; dropped along with it.
    Skipping,
}

/// Parse an object's command block into its command set and trigger groups.
///
/// Depth-1 lines are commands or group openers, depth-2 lines belong to the
/// group opened last. Anything else is a malformed object.
fn parse_command_block(
    lines: &[(usize, String)],
    warnings: &mut Vec<StoryboardError>,
) -> Result<(CommandSet, Vec<TriggerGroup>), StoryboardError> {
    let mut set = CommandSet::new();
    let mut triggers = Vec::new();
    let mut open = OpenGroup::None;

    for (line_no, line) in lines {
        let line_no = *line_no;
        let depth = line.bytes().take_while(|b| *b == b' ' || *b == b'_').count();
        let body = &line[depth..];
        let token = body.split(',').next().unwrap_or("").trim();
        let is_group = token == "L" || token == "T";

        match depth {
            1 => {
                let previous = std::mem::replace(&mut open, OpenGroup::None);
                close_group(previous, &mut set, &mut triggers, warnings);
                match parse_command_line(line_no, body) {
                    Ok(CommandLine::Property(cmds)) => set.insert(cmds, Repeat::ONCE),
                    Ok(CommandLine::Loop { start, iterations }) => {
                        open = OpenGroup::Loop {
                            line_no,
                            start,
                            iterations,
                            body: Vec::new(),
                        }
                    }
                    Ok(CommandLine::Trigger {
                        trigger,
                        start,
                        end,
                        group,
                    }) => {
                        open = OpenGroup::Trigger(TriggerGroup {
                            trigger,
                            start,
                            end: end.max(start),
                            group,
                            commands: CommandSet::new(),
                        })
                    }
                    Err(e) => {
                        report(e, warnings);
                        if is_group {
                            open = OpenGroup::Skipping;
                        }
                    }
                }
            }
            2 => {
                if is_group {
                    return Err(StoryboardError::malformed(
                        line_no,
                        "loop and trigger groups cannot nest",
                    ));
                }
                match open {
                    OpenGroup::None => {
                        return Err(StoryboardError::malformed(
                            line_no,
                            "nested command outside of a loop or trigger group",
                        ));
                    }
                    OpenGroup::Skipping => continue,
                    _ => {}
                }
                let cmds = match parse_command_line(line_no, body) {
                    Ok(CommandLine::Property(cmds)) => cmds,
                    Ok(_) => continue,
                    Err(e) => {
                        report(e, warnings);
                        continue;
                    }
                };
                match &mut open {
                    OpenGroup::Loop { body, .. } => body.push(cmds),
                    OpenGroup::Trigger(group) => group.commands.insert(cmds, Repeat::ONCE),
                    OpenGroup::None | OpenGroup::Skipping => {}
                }
            }
            _ => {
                return Err(StoryboardError::malformed(
                    line_no,
                    format!("unsupported nesting depth {depth}"),
                ));
            }
        }
    }
    close_group(open, &mut set, &mut triggers, warnings);
    Ok((set, triggers))
}

fn close_group(
    group: OpenGroup,
    set: &mut CommandSet,
    triggers: &mut Vec<TriggerGroup>,
    warnings: &mut Vec<StoryboardError>,
) {
    match group {
        OpenGroup::None | OpenGroup::Skipping => {}
        OpenGroup::Trigger(trigger) => triggers.push(trigger),
        OpenGroup::Loop {
            line_no,
            start,
            iterations,
            body,
        } => {
            let span = body
                .iter()
                .filter_map(PropertyCommands::span)
                .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)));
            let Some((local_start, local_end)) = span else {
                report(corrupt(line_no, "empty loop".to_string()), warnings);
                return;
            };
            let period = local_end - local_start;
            let repeat = match iterations {
                Some(n) => Repeat::times(start, period, n),
                None => Repeat::forever(start, period),
            };
            for cmds in body {
                set.insert(cmds, repeat);
            }
        }
    }
}

fn report(e: StoryboardError, warnings: &mut Vec<StoryboardError>) {
    warn!("{}", e);
    warnings.push(e);
}

/// Accumulates sprites per layer while the script is scanned.
///
/// Owns the per-layer z-index counters; each attached sprite takes the next
/// value of its layer's counter, in file order.
pub(crate) struct StoryboardBuilder<'a> {
    base_dir: &'a Path,
    loader: &'a mut dyn TextureLoader,
    textures: TextureCache,
    background: Vec<Sprite>,
    foreground: Vec<Sprite>,
    next_background_z: u32,
    next_foreground_z: u32,
    ignored: usize,
    warnings: Vec<StoryboardError>,
}

impl<'a> StoryboardBuilder<'a> {
    pub(crate) fn new(base_dir: &'a Path, loader: &'a mut dyn TextureLoader) -> Self {
        StoryboardBuilder {
            base_dir,
            loader,
            textures: TextureCache::new(),
            background: Vec::new(),
            foreground: Vec::new(),
            next_background_z: 0,
            next_foreground_z: 0,
            ignored: 0,
            warnings: Vec::new(),
        }
    }

    fn add_object(&mut self, obj: PendingObject) {
        if let Err(e) = self.build_object(obj) {
            report(e, &mut self.warnings);
        }
    }

    fn build_object(&mut self, obj: PendingObject) -> Result<(), StoryboardError> {
        let header = ObjectHeader::parse(obj.kind, obj.line, &obj.header)?;
        let (commands, triggers) = parse_command_block(&obj.commands, &mut self.warnings)?;

        let Some(layer) = header.layer else {
            debug!(
                "line {}: object on layer {:?} is not rendered",
                obj.line, header.layer_token
            );
            self.ignored += 1;
            return Ok(());
        };

        let mut frames = Frames::new();
        for path in header.frame_paths() {
            let full = self.base_dir.join(&path);
            frames.push(self.textures.resolve(&mut *self.loader, &full, &mut self.warnings));
        }

        let z_index = match layer {
            Layer::Background => {
                self.next_background_z += 1;
                ZIndex(self.next_background_z - 1)
            }
            Layer::Foreground => {
                self.next_foreground_z += 1;
                ZIndex(self.next_foreground_z - 1)
            }
        };

        let mut sprite = Sprite::new(header.origin, header.position, frames, commands)
            .with_z_index(z_index)
            .with_triggers(triggers);
        if let Some(anim) = header.animation {
            sprite = sprite.with_animation(anim.frame_delay, anim.loop_type);
        }

        match layer {
            Layer::Background => self.background.push(sprite),
            Layer::Foreground => self.foreground.push(sprite),
        }
        Ok(())
    }

    pub(crate) fn build(self) -> Storyboard {
        info!(
            "Storyboard parsed: {} background, {} foreground, {} ignored, {} textures, {} warnings",
            self.background.len(),
            self.foreground.len(),
            self.ignored,
            self.textures.len(),
            self.warnings.len()
        );
        Storyboard::from_parts(self.background, self.foreground, self.textures, self.warnings)
    }
}
