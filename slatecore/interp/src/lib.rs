/*

 ▄▄▄▄    ██▓    ▄▄▄       ▄████▄   ██ ▄█▀ ██▀███   █    ██   ██████  ██░ ██
▓█████▄ ▓██▒   ▒████▄    ▒██▀ ▀█   ██▄█▒ ▓██ ▒ ██▒ ██  ▓██▒▒██    ▒ ▓██░ ██▒
▒██▒ ▄██▒██░   ▒██  ▀█▄  ▒▓█    ▄ ▓███▄░ ▓██ ░▄█ ▒▓██  ▒██░░ ▓██▄   ▒██▀▀██░
▒██░█▀  ▒██░   ░██▄▄▄▄██ ▒▓▓▄ ▄██▒▓██ █▄ ▒██▀▀█▄  ▓▓█  ░██░  ▒   ██▒░▓█ ░██
░▓█  ▀█▓░██████▒▓█   ▓██▒▒ ▓███▀ ░▒██▒ █▄░██▓ ▒██▒▒▒█████▓ ▒██████▒▒░▓█▒░██▓
░▒▓███▀▒░ ▒░▓  ░▒▒   ▓▒█░░ ░▒ ▒  ░▒ ▒▒ ▓▒░ ▒▓ ░▒▓░░▒▓▒ ▒ ▒ ▒ ▒▓▒ ▒ ░ ▒ ░░▒░▒
▒░▒   ░ ░ ░ ▒  ░ ▒   ▒▒ ░  ░  ▒   ░ ░▒ ▒░  ░▒ ░ ▒░░░▒░ ░ ░ ░ ░▒  ░ ░ ▒ ░▒░ ░
 ░    ░   ░ ░    ░   ▒   ░        ░ ░░ ░   ░░   ░  ░░░ ░ ░ ░  ░  ░   ░  ░░ ░
 ░          ░  ░     ░  ░░ ░      ░  ░      ░        ░           ░   ░  ░  ░
      ░                  ░
Copyright (C) 2026, Blackrush LLC, All Rights Reserved
Created by Erik Olson, Tarpon Springs, Florida
For more information, visit BlackrushDrive.com

MIT License

Copyright (c) 2026 Erik Lee Olson for Blackrush, LLC

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.

*/

//! Tree-walking interpreter for Slate pseudocode.
//!
//! One [`Interpreter`] executes one program against a [`Host`]: OUTPUT lines,
//! warnings, and input requests stream over a channel as the program runs,
//! and the run ends with either `Done` (the full output log) or `Error` (a
//! rendered diagnostic). [`run_program`] wraps the whole dance for hosts that
//! just want to feed a source string and canned input lines.

pub mod blocks;
pub mod builtins;
pub mod host;
pub mod scope;
pub mod value;

mod eval;
mod exec;

use slate_common::Result;

pub use host::{Event, Host};

use exec::{Flow, Run};

pub struct Interpreter {
    host: Host,
}

impl Interpreter {
    pub fn new(host: Host) -> Self {
        Self { host }
    }

    /// Execute one program to completion. Returns the newline-joined OUTPUT
    /// log on success; the terminal `Done`/`Error` event is sent either way.
    pub fn interpret(&mut self, src: &str) -> Result<String> {
        let result = self.run(src);
        match result {
            Ok(log) => {
                let joined = log.join("\n");
                self.host.send(Event::Done(joined.clone()));
                Ok(joined)
            }
            Err(e) => {
                self.host.send(Event::Error(e.to_string()));
                Err(e)
            }
        }
    }

    fn run(&mut self, src: &str) -> Result<Vec<String>> {
        let lines = blocks::split_source(src);
        let (main, procs, funcs) = blocks::extract_definitions(lines)?;
        let mut run = Run::new(&self.host, procs, funcs);
        match run.exec_block(&main, false)? {
            Flow::Normal | Flow::Return(_) => {}
        }
        Ok(run.log)
    }
}

/// Run a program against canned input lines, collecting every event. The
/// input channel is closed after the canned lines, so a program that asks
/// for more input than was supplied stops instead of hanging.
pub fn run_program(src: &str, inputs: &[&str]) -> (Result<String>, Vec<Event>) {
    let (host, ev_rx, in_tx, _cancel) = Host::channel();
    for l in inputs {
        let _ = in_tx.send((*l).to_string());
    }
    drop(in_tx);
    let mut interp = Interpreter::new(host);
    let result = interp.interpret(src);
    drop(interp);
    let events = ev_rx.try_iter().collect();
    (result, events)
}
