//! Text dump of a list's levels, for debugging.
//!
//! Each node prints its span at every level it participates in; a `|` marks
//! a level where a link from an earlier node passes over it.
//!
//! ```text
//! <             head> [ 1] [ 2] [ 2]
//!                       |    |    |
//! <1     10    1> [ 1]   |    |
//!                   |    |    |
//! <2     20    2> [ 1] [ 1] [ 1]
//!                   |    |
//! <3     30    3> [ 0] [ 0]
//! <              end>   _    _    _
//! ```

use std::fmt::{self, Write};

use crate::entity::Rankable;
use crate::level::MAX_LEVEL;
use crate::skip_list::RankList;

const BAR: &str = "  |  ";
const GAP: &str = "     ";

impl<E: Rankable, R> fmt::Display for RankList<E, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render(self, f)
    }
}

fn render<E: Rankable, R, W: Write>(list: &RankList<E, R>, w: &mut W) -> fmt::Result {
    let height = list.height();
    // Whether the most recent link at each level still has a node ahead of it.
    let mut open = [false; MAX_LEVEL];

    let mut line = format!("<{:>17}> ", "head");
    let label_width = line.len();
    for (i, passing) in open.iter_mut().enumerate().take(height) {
        if list.head_forward(i).is_some() {
            let span = list.head_span(i).unwrap_or_default();
            write!(line, "[{:2}] ", span)?;
            *passing = true;
        } else {
            line.push_str(GAP);
        }
    }
    emit(w, &line, label_width, &open[..height])?;

    let mut rank = 0;
    let mut node = list.first();
    while let Some(n) = node {
        rank += 1;
        let mut line = format!("<{} {:6} {:4}> ", n.entity().uid(), n.score(), rank);
        let label_width = line.len();
        for (i, passing) in open.iter_mut().enumerate().take(height) {
            match n.span(i) {
                Some(span) => {
                    write!(line, "[{:2}] ", span)?;
                    *passing = n.forward(i).is_some();
                }
                None if *passing => line.push_str(BAR),
                None => line.push_str(GAP),
            }
        }
        emit(w, &line, label_width, &open[..height])?;
        node = n.next();
    }

    let mut line = format!("<{:>17}> ", "end");
    for _ in 0..height {
        line.push_str("  _  ");
    }
    writeln!(w, "{}", line.trim_end())
}

/// Write a node line and, when any link continues below it, the connector line.
fn emit<W: Write>(w: &mut W, line: &str, label_width: usize, open: &[bool]) -> fmt::Result {
    writeln!(w, "{}", line.trim_end())?;
    if !open.contains(&true) {
        return Ok(());
    }
    let mut connector = " ".repeat(label_width);
    for &passing in open {
        connector.push_str(if passing { BAR } else { GAP });
    }
    writeln!(w, "{}", connector.trim_end())
}
