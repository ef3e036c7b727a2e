use std::cell::Cell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use core_notes::{AuthGate, DraftError, NoteDraft, NotePersistence, NotesStore};
use core_types::{CredentialVerifier, Note, NoteId};
use i18n::I18n;
use tracing::{debug, warn};

use crate::input::{Command, apply_answers, note_at_row};

const PREVIEW_LINES: usize = 2;

pub struct Console<R, W> {
    input: R,
    output: W,
    i18n: I18n,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, i18n: I18n) -> Self {
        Self {
            input,
            output,
            i18n,
        }
    }

    pub fn run<V: CredentialVerifier>(
        &mut self,
        gate: &mut AuthGate<V>,
        persistence: NotePersistence,
    ) -> Result<()> {
        if !self.login(gate)? {
            return Ok(());
        }

        let save_failed = Rc::new(Cell::new(false));
        let mut store = NotesStore::open(persistence);
        let flag = save_failed.clone();
        store.on_persist_error(move |_| flag.set(true));

        self.render(&store)?;
        loop {
            write!(self.output, "> ")?;
            self.output.flush()?;
            let Some(line) = self.read_line()? else {
                break;
            };

            let command = Command::parse(&line);
            debug!(?command, "console command");
            match command {
                Command::List => self.render(&store)?,
                Command::Add => self.add(&mut store)?,
                Command::Edit(row) => self.edit(&mut store, row)?,
                Command::Pin(row) => self.toggle_pin(&mut store, row)?,
                Command::Delete(row) => self.delete(&mut store, row)?,
                Command::Sort(option) => {
                    store.set_sort_option(option);
                    self.render(&store)?;
                }
                Command::Lang(lang) => {
                    self.i18n.set_language(lang);
                    self.render(&store)?;
                }
                Command::Help => self.say("help")?,
                Command::Quit => break,
                Command::Empty => {}
                Command::Unknown => self.say("error.unknown_command")?,
            }

            if save_failed.replace(false) {
                self.say("error.save_failed")?;
            }
        }

        gate.logout();
        Ok(())
    }

    fn login<V: CredentialVerifier>(&mut self, gate: &mut AuthGate<V>) -> Result<bool> {
        writeln!(self.output, "{}", self.i18n.t("login.title"))?;
        while !gate.is_authenticated() {
            let Some(username) = self.ask("login.username")? else {
                return Ok(false);
            };
            let Some(password) = self.ask("login.password")? else {
                return Ok(false);
            };
            if gate.login(&username, &password).is_err() {
                writeln!(
                    self.output,
                    "{} : {}",
                    self.i18n.t("login.error.title"),
                    self.i18n.t("login.error.message")
                )?;
            }
        }
        Ok(true)
    }

    fn add(&mut self, store: &mut NotesStore) -> Result<()> {
        writeln!(self.output, "{}", self.i18n.t("form.new"))?;
        let Some(draft) = self.fill_draft(NoteDraft::default())? else {
            return Ok(());
        };
        if self.report_invalid(&draft)? {
            return Ok(());
        }

        store.add(draft.into_new_note());
        self.say("action.added")
    }

    fn edit(&mut self, store: &mut NotesStore, row: usize) -> Result<()> {
        let Some(note) = note_at_row(&store.derived_view(), row).cloned() else {
            return self.say("error.no_row");
        };

        writeln!(self.output, "{}", self.i18n.t("form.edit"))?;
        writeln!(
            self.output,
            "  {} : {}",
            self.i18n.t("notes.created"),
            format_date(note.created_at)
        )?;
        writeln!(
            self.output,
            "  {} : {}",
            self.i18n.t("notes.updated"),
            format_date(note.updated_at)
        )?;
        let Some(draft) = self.fill_draft(NoteDraft::from_note(&note))? else {
            return Ok(());
        };
        if self.report_invalid(&draft)? {
            return Ok(());
        }

        store.update(draft.apply_to(&note));
        self.say("action.updated")
    }

    fn toggle_pin(&mut self, store: &mut NotesStore, row: usize) -> Result<()> {
        let Some(id) = self.id_at_row(store, row) else {
            return self.say("error.no_row");
        };
        match store.toggle_pin(id) {
            Some(true) => self.say("action.pinned")?,
            Some(false) => self.say("action.unpinned")?,
            None => self.say("error.no_row")?,
        }
        self.render(store)
    }

    fn delete(&mut self, store: &mut NotesStore, row: usize) -> Result<()> {
        let Some(id) = self.id_at_row(store, row) else {
            return self.say("error.no_row");
        };
        store.delete_by_id(id);
        self.say("action.deleted")?;
        self.render(store)
    }

    fn fill_draft(&mut self, draft: NoteDraft) -> Result<Option<NoteDraft>> {
        let hint = !draft.title.is_empty();

        let Some(title) = self.ask_keep("form.title", &draft.title, hint)? else {
            return Ok(None);
        };
        let Some(content) = self.ask_keep("form.content", &draft.content, hint)? else {
            return Ok(None);
        };
        let Some(pin) = self.ask("form.pin")? else {
            return Ok(None);
        };

        Ok(Some(apply_answers(draft, title, content, &pin)))
    }

    fn report_invalid(&mut self, draft: &NoteDraft) -> Result<bool> {
        match draft.validate() {
            Ok(()) => Ok(false),
            Err(DraftError::EmptyTitle) => self.say("form.error.title").map(|_| true),
            Err(DraftError::EmptyContent) => self.say("form.error.content").map(|_| true),
        }
    }

    fn render(&mut self, store: &NotesStore) -> Result<()> {
        writeln!(
            self.output,
            "\n# {}  ({} : {})",
            self.i18n.t("app.title"),
            self.i18n.t("sort.label"),
            self.i18n.t(store.sort_option().label_key())
        )?;

        let grouped = store.grouped_view();
        let mut row = 1;
        if !grouped.pinned.is_empty() {
            writeln!(self.output, "\n== {} ==", self.i18n.t("notes.pinned"))?;
            for note in &grouped.pinned {
                self.render_row(row, note)?;
                row += 1;
            }
        }

        writeln!(self.output, "\n== {} ==", self.i18n.t("notes.section"))?;
        if grouped.others.is_empty() {
            writeln!(self.output, "   {}", self.i18n.t("notes.empty"))?;
        }
        for note in &grouped.others {
            self.render_row(row, note)?;
            row += 1;
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn render_row(&mut self, row: usize, note: &Note) -> Result<()> {
        let marker = if note.is_pinned { "*" } else { " " };
        writeln!(self.output, "{row:>3}.{marker} {}", note.title)?;
        for line in note.content.lines().take(PREVIEW_LINES) {
            writeln!(self.output, "       {line}")?;
        }
        writeln!(
            self.output,
            "       {} : {}",
            self.i18n.t("notes.updated"),
            format_date(note.updated_at)
        )?;
        Ok(())
    }

    fn id_at_row(&self, store: &NotesStore, row: usize) -> Option<NoteId> {
        note_at_row(&store.derived_view(), row).map(|note| note.id)
    }

    fn ask(&mut self, label_key: &str) -> Result<Option<String>> {
        write!(self.output, "{} : ", self.i18n.t(label_key))?;
        self.output.flush()?;
        self.read_line()
    }

    fn ask_keep(&mut self, label_key: &str, current: &str, hint: bool) -> Result<Option<String>> {
        if hint {
            write!(
                self.output,
                "{} [{}] ({}) : ",
                self.i18n.t(label_key),
                current,
                self.i18n.t("form.keep_hint")
            )?;
            self.output.flush()?;
            return self.read_line();
        }
        self.ask(label_key)
    }

    fn say(&mut self, key: &str) -> Result<()> {
        writeln!(self.output, "{}", self.i18n.t(key))?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<Option<String>> {
        let mut raw = Vec::new();
        if self.input.read_until(b'\n', &mut raw)? == 0 {
            return Ok(None);
        }
        while matches!(raw.last(), Some(b'\n' | b'\r')) {
            raw.pop();
        }
        let line = match String::from_utf8(raw) {
            Ok(line) => line,
            Err(err) => {
                warn!("input line is not valid utf-8");
                String::from_utf8_lossy(err.as_bytes()).into_owned()
            }
        };
        Ok(Some(line))
    }
}

fn format_date(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}
