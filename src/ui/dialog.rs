//! Selector dialogs.
//!
//! Each dialog is a small state machine: [`Dialog::handle`] consumes one
//! [`InputEvent`] and either asks for more or finishes with a value, and
//! [`Dialog::render`] draws the current state. [`run`] drives a dialog to
//! completion against a display and an input source.

use core::fmt::Write;

use heapless::String;

use super::input_logic::{wrap_next, wrap_prev};
use super::{show_long_text, Display};
use crate::config::{DISPLAY_COLUMNS, ROW_PITCH};
use crate::input::{Button, Direction, InputEvent, InputSource};
use crate::text::{tail, truncated, Text};

/// Characters offered by [`ComposeText`], in cycling order.
pub const ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789.!@#$%^&*()_-+=[]{};:,<>/? ";

/// Outcome of one [`Dialog::handle`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step<T> {
    Continue,
    Done(T),
}

pub trait Dialog {
    type Output;

    fn handle(&mut self, event: InputEvent) -> Step<Self::Output>;

    fn render<D: Display + ?Sized>(&self, display: &mut D);
}

/// Render, wait for an event, handle it; repeat until the dialog finishes.
pub fn run<G, D, I>(dialog: &mut G, display: &mut D, input: &mut I) -> G::Output
where
    G: Dialog,
    D: Display + ?Sized,
    I: InputSource + ?Sized,
{
    loop {
        dialog.render(display);
        if let Step::Done(value) = dialog.handle(input.wait_event()) {
            return value;
        }
    }
}

/// What a dialog produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogResult {
    SelectedOption(Text),
    ComposedText(Text),
}

impl DialogResult {
    pub fn as_str(&self) -> &str {
        match self {
            DialogResult::SelectedOption(text) | DialogResult::ComposedText(text) => text.as_str(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Move {
    Back,
    Forward,
}

fn movement(event: InputEvent) -> Option<Move> {
    match event {
        InputEvent::Press(Button::Left) | InputEvent::Turn(Direction::CounterClockwise) => {
            Some(Move::Back)
        }
        InputEvent::Press(Button::Right) | InputEvent::Turn(Direction::Clockwise) => {
            Some(Move::Forward)
        }
        _ => None,
    }
}

fn step(selected: usize, count: usize, mv: Move) -> usize {
    match mv {
        Move::Back => wrap_prev(selected, count),
        Move::Forward => wrap_next(selected, count),
    }
}

/// Dialog phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Static prompt; the next press or turn dismisses it.
    ShowPrompt,
    Selecting,
    /// Select is down; releasing it accepts the highlighted item.
    Pressing,
    /// Input finished; waiting for select to be let go.
    Confirmed,
}

/// `{Yes, No}` choice, starting on `No`.
pub struct YesNo<'a> {
    title: &'a str,
    selected: usize,
}

impl<'a> YesNo<'a> {
    const CHOICES: [char; 2] = ['Y', 'N'];

    pub fn new(title: &'a str) -> Self {
        Self { title, selected: 1 }
    }

    pub fn is_yes(&self) -> bool {
        self.selected == 0
    }
}

impl Dialog for YesNo<'_> {
    type Output = bool;

    fn handle(&mut self, event: InputEvent) -> Step<bool> {
        if event == InputEvent::Press(Button::Select) {
            return Step::Done(self.is_yes());
        }
        if let Some(mv) = movement(event) {
            self.selected = step(self.selected, Self::CHOICES.len(), mv);
        }
        Step::Continue
    }

    fn render<D: Display + ?Sized>(&self, display: &mut D) {
        let mut line: String<16> = String::new();
        let _ = write!(line, "Selected: {}", Self::CHOICES[self.selected]);
        display.clear();
        display.draw_text(self.title, 0);
        display.draw_text(&line, ROW_PITCH);
        display.present();
    }
}

/// Question followed by a cyclic pick over `options`.
pub struct ChooseOption<'a, S> {
    question: &'a str,
    options: &'a [S],
    selected: usize,
    phase: Phase,
}

impl<'a, S: AsRef<str>> ChooseOption<'a, S> {
    /// `None` when there is nothing to choose from.
    pub fn new(question: &'a str, options: &'a [S]) -> Option<Self> {
        if options.is_empty() {
            return None;
        }
        Some(Self {
            question,
            options,
            selected: 0,
            phase: Phase::ShowPrompt,
        })
    }

    fn highlighted(&self) -> &'a str {
        self.options
            .get(self.selected)
            .map_or("", |option| option.as_ref())
    }
}

impl<S: AsRef<str>> Dialog for ChooseOption<'_, S> {
    /// Index of the chosen option.
    type Output = usize;

    fn handle(&mut self, event: InputEvent) -> Step<usize> {
        match self.phase {
            Phase::ShowPrompt => {
                if matches!(event, InputEvent::Press(_) | InputEvent::Turn(_)) {
                    self.phase = Phase::Selecting;
                }
                Step::Continue
            }
            _ => {
                if event == InputEvent::Press(Button::Select) {
                    self.phase = Phase::Confirmed;
                    return Step::Done(self.selected);
                }
                if let Some(mv) = movement(event) {
                    self.selected = step(self.selected, self.options.len(), mv);
                }
                Step::Continue
            }
        }
    }

    fn render<D: Display + ?Sized>(&self, display: &mut D) {
        if self.phase == Phase::ShowPrompt {
            show_long_text(display, self.question);
            return;
        }
        display.clear();
        display.draw_text("Selection:", 0);
        display.draw_text(self.highlighted(), ROW_PITCH);
        display.present();
    }
}

/// Character-by-character text entry over [`ALPHABET`].
///
/// A short select press appends the highlighted character; holding select
/// finishes, and the dialog returns once the button is released.
pub struct ComposeText<'a> {
    title: &'a str,
    selected: usize,
    buffer: Text,
    phase: Phase,
}

impl<'a> ComposeText<'a> {
    pub fn new(title: &'a str) -> Self {
        Self {
            title,
            selected: 0,
            buffer: Text::new(),
            phase: Phase::Selecting,
        }
    }

    fn highlighted(&self) -> char {
        ALPHABET.chars().nth(self.selected).unwrap_or(' ')
    }
}

impl Dialog for ComposeText<'_> {
    type Output = Text;

    fn handle(&mut self, event: InputEvent) -> Step<Text> {
        match (self.phase, event) {
            (Phase::Selecting, InputEvent::Press(Button::Select)) => {
                self.phase = Phase::Pressing;
            }
            (Phase::Selecting, _) => {
                if let Some(mv) = movement(event) {
                    self.selected = step(self.selected, ALPHABET.len(), mv);
                }
            }
            (Phase::Pressing, InputEvent::Release(Button::Select)) => {
                if self.buffer.push(self.highlighted()).is_err() {
                    warn!("compose: text full, dropping input");
                }
                self.phase = Phase::Selecting;
            }
            (Phase::Pressing, InputEvent::Hold(Button::Select)) => {
                self.phase = Phase::Confirmed;
            }
            (Phase::Confirmed, InputEvent::Release(Button::Select)) => {
                return Step::Done(self.buffer.clone());
            }
            _ => {}
        }
        Step::Continue
    }

    fn render<D: Display + ?Sized>(&self, display: &mut D) {
        display.clear();
        if self.phase == Phase::Confirmed {
            display.draw_text("Saved!", 0);
            display.draw_text("Let go.", ROW_PITCH);
        } else {
            let mut line: String<16> = String::new();
            let _ = write!(line, "Selected: {}", self.highlighted());
            display.draw_text(self.title, 0);
            display.draw_text(&line, ROW_PITCH);
            display.draw_text(tail(&self.buffer, DISPLAY_COLUMNS), 2 * ROW_PITCH);
        }
        display.present();
    }
}

/// Blocking yes/no question.
pub fn ask_yes_no<D, I>(display: &mut D, input: &mut I, title: &str) -> bool
where
    D: Display + ?Sized,
    I: InputSource + ?Sized,
{
    run(&mut YesNo::new(title), display, input)
}

/// Show `question`, then let the user pick one of `options`.
///
/// Returns `None` without touching the display when `options` is empty.
pub fn choose_option<'o, S, D, I>(
    display: &mut D,
    input: &mut I,
    question: &str,
    options: &'o [S],
) -> Option<&'o str>
where
    S: AsRef<str>,
    D: Display + ?Sized,
    I: InputSource + ?Sized,
{
    let mut dialog = ChooseOption::new(question, options)?;
    let index = run(&mut dialog, display, input);
    options.get(index).map(|option| option.as_ref())
}

/// Blocking character-by-character text entry.
pub fn compose_text<D, I>(display: &mut D, input: &mut I, title: &str) -> Text
where
    D: Display + ?Sized,
    I: InputSource + ?Sized,
{
    run(&mut ComposeText::new(title), display, input)
}

/// Pick from `options`, or compose free text when there are none.
pub fn pick_or_compose<S, D, I>(
    display: &mut D,
    input: &mut I,
    title: &str,
    options: &[S],
) -> DialogResult
where
    S: AsRef<str>,
    D: Display + ?Sized,
    I: InputSource + ?Sized,
{
    match choose_option(display, input, title, options) {
        Some(option) => DialogResult::SelectedOption(truncated(option)),
        None => DialogResult::ComposedText(compose_text(display, input, title)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FrameLog, ScriptedInput};

    use InputEvent::{Hold, Press, Release, Turn};

    const LEFT: InputEvent = Press(Button::Left);
    const RIGHT: InputEvent = Press(Button::Right);
    const SELECT: InputEvent = Press(Button::Select);
    const LET_GO: InputEvent = Release(Button::Select);
    const HOLD: InputEvent = Hold(Button::Select);
    const CW: InputEvent = Turn(Direction::Clockwise);
    const CCW: InputEvent = Turn(Direction::CounterClockwise);

    #[test]
    fn yes_no_defaults_to_no() {
        let mut d = FrameLog::default();
        let mut input = ScriptedInput::new([SELECT]);
        assert!(!ask_yes_no(&mut d, &mut input, "Reset Config?"));
        assert_eq!(d.frames[0][1].1, "Selected: N");
    }

    #[test]
    fn yes_no_moves_with_buttons_and_encoder() {
        let mut d = FrameLog::default();
        assert!(ask_yes_no(&mut d, &mut ScriptedInput::new([RIGHT, SELECT]), "?"));
        assert!(ask_yes_no(&mut d, &mut ScriptedInput::new([LEFT, SELECT]), "?"));
        assert!(ask_yes_no(&mut d, &mut ScriptedInput::new([CW, SELECT]), "?"));
        assert!(!ask_yes_no(&mut d, &mut ScriptedInput::new([CW, CCW, SELECT]), "?"));
    }

    #[test]
    fn yes_no_ignores_stray_release() {
        let mut d = FrameLog::default();
        let mut input = ScriptedInput::new([LET_GO, RIGHT, SELECT]);
        assert!(ask_yes_no(&mut d, &mut input, "New Message?"));
    }

    #[test]
    fn choose_option_shows_question_first() {
        let mut d = FrameLog::default();
        let options = ["Yes", "No", "Maybe"];
        // First press only dismisses the question.
        let mut input = ScriptedInput::new([RIGHT, RIGHT, SELECT]);
        let choice = choose_option(&mut d, &mut input, "Tea at four?", &options);
        assert_eq!(choice, Some("No"));
        assert_eq!(d.frames[0], vec![(0, "Tea at four?".to_string())]);
        assert_eq!(d.frames[1][0].1, "Selection:");
        assert_eq!(d.frames[1][1].1, "Yes");
    }

    #[test]
    fn choose_option_right_presses_land_modulo_option_count() {
        let options = ["Yes", "No", "Maybe"];
        for k in 0..2 * options.len() {
            let mut d = FrameLog::default();
            let script = core::iter::once(SELECT) // dismiss the question
                .chain(core::iter::repeat(RIGHT).take(k))
                .chain([SELECT]);
            let mut input = ScriptedInput::new(script);
            assert_eq!(
                choose_option(&mut d, &mut input, "?", &options),
                Some(options[k % options.len()]),
                "{k} right presses"
            );
        }
    }

    #[test]
    fn choose_option_wraps_backwards() {
        let mut d = FrameLog::default();
        let options = ["Yes", "No", "Maybe"];
        let mut input = ScriptedInput::new([CW, LEFT, SELECT]);
        assert_eq!(
            choose_option(&mut d, &mut input, "?", &options),
            Some("Maybe")
        );
    }

    #[test]
    fn choose_option_with_no_options_returns_none() {
        let mut d = FrameLog::default();
        let mut input = ScriptedInput::new([]);
        let options: [&str; 0] = [];
        assert_eq!(choose_option(&mut d, &mut input, "?", &options), None);
        assert!(d.frames.is_empty());
    }

    #[test]
    fn compose_appends_on_short_press() {
        let mut d = FrameLog::default();
        let mut input = ScriptedInput::new([
            RIGHT, RIGHT, RIGHT, RIGHT, RIGHT, RIGHT, RIGHT, SELECT, LET_GO, // h
            LEFT, LEFT, LEFT, LEFT, LEFT, LEFT, LEFT, // a
            RIGHT, RIGHT, RIGHT, RIGHT, RIGHT, RIGHT, RIGHT, RIGHT, SELECT, LET_GO, // i
            SELECT, HOLD, LET_GO,
        ]);
        assert_eq!(compose_text(&mut d, &mut input, "Message:").as_str(), "hi");
        assert_eq!(d.last_text(), ["Saved!", "Let go."]);
    }

    #[test]
    fn compose_hold_does_not_append() {
        let mut d = FrameLog::default();
        let mut input = ScriptedInput::new([SELECT, LET_GO, SELECT, HOLD, LET_GO]);
        assert_eq!(compose_text(&mut d, &mut input, "User:").as_str(), "a");
    }

    #[test]
    fn compose_waits_for_release_after_hold() {
        let mut dialog = ComposeText::new("User:");
        assert_eq!(dialog.handle(SELECT), Step::Continue);
        assert_eq!(dialog.handle(HOLD), Step::Continue);
        assert_eq!(dialog.handle(RIGHT), Step::Continue);
        assert_eq!(dialog.handle(LET_GO), Step::Done(Text::new()));
    }

    #[test]
    fn compose_wraps_to_trailing_space() {
        let mut dialog = ComposeText::new("Message:");
        dialog.handle(LEFT);
        assert_eq!(dialog.highlighted(), ' ');
    }

    #[test]
    fn compose_stops_at_capacity() {
        let mut d = FrameLog::default();
        let presses = (0..70).flat_map(|_| [SELECT, LET_GO]);
        let mut input = ScriptedInput::new(presses.chain([SELECT, HOLD, LET_GO]));
        let text = compose_text(&mut d, &mut input, "Message:");
        assert_eq!(text.as_str(), "a".repeat(64));
        assert_eq!(input.remaining(), 0);
    }

    #[test]
    fn compose_shows_tail_of_long_text() {
        let mut d = FrameLog::default();
        let mut dialog = ComposeText::new("Message:");
        for _ in 0..20 {
            dialog.handle(SELECT);
            dialog.handle(LET_GO);
        }
        dialog.render(&mut d);
        assert_eq!(d.last_text()[2], "a".repeat(16));
    }

    #[test]
    fn pick_or_compose_falls_back_to_entry() {
        let mut d = FrameLog::default();
        let mut input = ScriptedInput::new([SELECT, LET_GO, SELECT, HOLD, LET_GO]);
        let none: [&str; 0] = [];
        let result = pick_or_compose(&mut d, &mut input, "User:", &none);
        assert_eq!(result, DialogResult::ComposedText(truncated("a")));
        assert_eq!(result.as_str(), "a");
    }
}
