//! Scene scripts: element states plus a list of host events to replay.

use std::rc::Rc;

use anyhow::{bail, ensure, Context, Result};

use choreo_machine::prelude::*;

/// The element every `state` line belongs to.
pub const STAGE: ElementId = ElementId(1);

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    State { name: String, trigger: Option<String>, description: String },
    Select { selector: String, element: ElementId },
    Start { visible: bool },
    Fire { event: String, element: ElementId },
    Frame(u64),
    Visible(bool),
    Show,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub number: usize,
    pub command: Command,
}

#[derive(Debug, Default)]
pub struct Scene {
    pub lines: Vec<Line>,
}

impl Scene {
    pub fn parse(src: &str) -> Result<Self> {
        let mut lines = Vec::new();
        for (i, raw) in src.lines().enumerate() {
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') {
                continue;
            }
            let command = parse_command(text).with_context(|| format!("line {}: {text:?}", i + 1))?;
            lines.push(Line { number: i + 1, command });
        }
        Ok(Self { lines })
    }

    /// Run the scene, printing what the stage looks like at each `show`.
    pub fn play(&self) -> Result<()> {
        let host = Rc::new(HeadlessHost::new());
        let frames = Rc::new(FrameQueue::new());
        let styles = Rc::new(StyleCache::new());
        let services = Services::new(host.clone(), styles.clone(), frames.clone());

        let mut builder = Some(ElementBuilder::new(STAGE, services));
        let mut maestro: Option<Maestro> = None;

        for line in &self.lines {
            let at = line.number;
            match &line.command {
                Command::State { name, trigger, description } => {
                    let Some(b) = builder.take() else { bail!("line {at}: `state` after `start`") };
                    builder = Some(match trigger {
                        Some(t) => b.state_with_trigger(name, t, description),
                        None => b.state(name, description),
                    });
                }
                Command::Select { selector, element } => host.register_selector(selector.clone(), vec![*element]),
                Command::Start { visible } => {
                    let Some(b) = builder.take() else { bail!("line {at}: `start` given twice") };
                    let m = b.build();
                    m.start(*visible);
                    maestro = Some(m);
                }
                Command::Fire { event, element } => {
                    let ran = host.dispatch(*element, event);
                    println!("  {at:>3}  fire {event} on #{} ({ran} handler(s))", element.0);
                }
                Command::Frame(n) => {
                    for _ in 0..*n {
                        let tick = frames.tick();
                        println!("  {at:>3}  frame {} ({} callback(s))", tick.frame_index, tick.ran);
                    }
                }
                Command::Visible(visible) => {
                    let m = maestro.as_ref().with_context(|| format!("line {at}: `visible` before `start`"))?;
                    m.visibility_changed(*visible);
                }
                Command::Show => {
                    let m = maestro.as_ref().with_context(|| format!("line {at}: `show` before `start`"))?;
                    let state = m.current_state().unwrap_or_else(|| "-".into());
                    let busy = if m.is_busy() { "busy" } else { "idle" };
                    println!("  {at:>3}  state={state} {busy} classes={:?}", host.classes(STAGE));
                }
            }
        }

        println!();
        println!("  stylesheet ({} rule(s)):", styles.len());
        for rule in styles.stylesheet().lines() {
            println!("    {rule}");
        }
        Ok(())
    }
}

fn parse_command(text: &str) -> Result<Command> {
    let (keyword, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    let rest = rest.trim();
    let command = match keyword {
        "state" => {
            let (head, description) = rest.split_once('=').context("expected `state <name> = <description>`")?;
            let (name, trigger) = match head.split_once('@') {
                Some((name, trigger)) => (name.trim(), Some(trigger.trim().to_string())),
                None => (head.trim(), None),
            };
            Command::State { name: name.to_string(), trigger, description: description.trim().to_string() }
        }
        "select" => {
            let (selector, id) = rest.split_once(char::is_whitespace).context("expected `select <selector> <id>`")?;
            Command::Select { selector: selector.to_string(), element: element_id(id)? }
        }
        "start" => match rest {
            "visible" => Command::Start { visible: true },
            "hidden" | "" => Command::Start { visible: false },
            other => bail!("expected `visible` or `hidden`, got {other:?}"),
        },
        "fire" => {
            let mut words = rest.split_whitespace();
            let event = words.next().context("expected an event name")?.to_string();
            let element = match (words.next(), words.next()) {
                (None, _) => STAGE,
                (Some("on"), Some(id)) => element_id(id)?,
                _ => bail!("expected `fire <event> [on <id>]`"),
            };
            Command::Fire { event, element }
        }
        "frame" => {
            let n = if rest.is_empty() { 1 } else { rest.parse().context("expected a frame count")? };
            Command::Frame(n)
        }
        "visible" => Command::Visible(rest.parse().context("expected `true` or `false`")?),
        "show" => Command::Show,
        other => bail!("unknown command {other:?}"),
    };
    Ok(command)
}

fn element_id(word: &str) -> Result<ElementId> {
    let id: u64 = word.trim().parse().with_context(|| format!("bad element id {word:?}"))?;
    ensure!(id > 0, "element ids start at 1");
    Ok(ElementId(id))
}
