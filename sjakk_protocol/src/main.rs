use std::io::stdin;

use log::{debug, warn};
use sjakk_engine::{
    search_result::{SearchInfo, SearchResult},
    SearchReporter,
};
use sjakk_protocol::{command::Command, response::Response, session::Session};

/// Formats search progress and results into protocol lines on stdout.
/// Called from the worker thread; println is line-atomic, so search output
/// never interleaves mid-line with command responses.
#[derive(Clone)]
struct StdoutReporter;

impl SearchReporter for StdoutReporter {
    fn receive_search_info(&self, info: SearchInfo) {
        println!("{}", Response::info(&info));
    }

    fn search_complete(&self, result: SearchResult) {
        debug!(
            "search finished: depth {} after {} nodes in {:?}",
            result.stats.depth, result.stats.nodes_searched, result.elapsed
        );
        println!("{}", Response::best_move(&result));
    }
}

fn main() {
    env_logger::init();

    let mut session = Session::new(StdoutReporter);

    let mut line = String::new();
    loop {
        line.clear();
        match stdin().read_line(&mut line) {
            // EOF behaves like quit
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("failed to read from stdin: {e}");
                break;
            }
        }

        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", Response::error(e));
                continue;
            }
        };

        debug!("received {command:?}");

        let reply = session.handle_command(command);
        for response in &reply.responses {
            println!("{response}");
        }

        if reply.quit {
            break;
        }
    }
}
