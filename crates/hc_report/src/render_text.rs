//! Plain-text renderer: share grid, seat table, seat bar with the majority
//! marker, verdict, optional district breakdown.

use std::fmt::{self, Write};

use hc_pipeline::MajorityVerdict;

use crate::structure::{ReportModel, SeatCount};

const BAR_WIDTH: usize = 60;
const FILLS: &[char] = &['#', '=', '*', '+', '%', '@', 'o', '~', ':', 'x'];

pub fn render_text(m: &ReportModel) -> String {
    let mut s = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut s, m);
    s
}

pub fn write_text<W: Write>(w: &mut W, m: &ReportModel) -> fmt::Result {
    writeln!(w, "{}", m.cover.title)?;
    writeln!(w, "projection: {}   seats: {}", m.cover.projection, m.cover.total_seats)?;
    writeln!(w)?;

    writeln!(w, "Vote shares (%)")?;
    let cols = (m.cover.grid_columns as usize).max(1);
    for chunk in m.parties.chunks(cols) {
        let cells: Vec<String> = chunk.iter().map(|r| format!("{:<8}{:>6}", r.party.as_str(), r.pct)).collect();
        writeln!(w, "  {}", cells.join("  ").trim_end())?;
    }
    writeln!(w)?;

    writeln!(w, "{:<10} {:>8} {:>8} {:>6}", "Party", "Base %", "Sim %", "Seats")?;
    for r in &m.parties {
        writeln!(w, "{:<10} {:>8} {:>8} {:>6}", r.party.as_str(), r.baseline_pct, r.pct, r.seats)?;
    }
    writeln!(w, "{:<10} {:>8} {:>8} {:>6}", "Total", "", "", m.cover.total_seats)?;
    for r in m.parties.iter().filter(|r| r.aggregate) {
        if let Some(note) = &r.note {
            writeln!(w, "{}: {note}", r.party)?;
        }
    }
    writeln!(w)?;

    write_bar(w, m)?;
    writeln!(w)?;
    write_verdict(w, m)?;

    if let Some(rows) = &m.districts {
        writeln!(w)?;
        writeln!(w, "Districts")?;
        for d in rows {
            writeln!(w, "  {} ({}): {}", d.district, d.seats, seat_list(&d.allocation))?;
        }
    }
    Ok(())
}

/// Stacked bar of seat-holding parties, `BAR_WIDTH` cells wide, with a caret
/// under the majority threshold.
fn write_bar<W: Write>(w: &mut W, m: &ReportModel) -> fmt::Result {
    let total = m.cover.total_seats as usize;
    if total == 0 {
        return Ok(());
    }
    let mut bar = String::with_capacity(BAR_WIDTH);
    let mut legend = Vec::new();
    let mut cum = 0usize;
    let mut drawn = 0usize;
    for (i, r) in m.parties.iter().filter(|r| r.seats > 0).enumerate() {
        let fill = FILLS[i % FILLS.len()];
        cum += r.seats as usize;
        let edge = (cum * BAR_WIDTH + total / 2) / total;
        bar.extend(std::iter::repeat(fill).take(edge.saturating_sub(drawn)));
        drawn = drawn.max(edge);
        legend.push(format!("{fill} {}", r.party.as_str()));
    }

    let mark = ((m.majority.threshold as usize * BAR_WIDTH + total / 2) / total).min(BAR_WIDTH);
    writeln!(w, "|{bar}|")?;
    writeln!(w, " {}^ majority ({})", " ".repeat(mark.saturating_sub(1)), m.majority.threshold)?;
    writeln!(w, "  {}", legend.join("  "))
}

fn write_verdict<W: Write>(w: &mut W, m: &ReportModel) -> fmt::Result {
    match &m.majority.verdict {
        MajorityVerdict::Block { name, seats, surplus } => {
            writeln!(w, "{name} has an absolute majority: {seats} seats (+{surplus})")?;
        }
        MajorityVerdict::Hung { blocks, unaligned } => {
            writeln!(w, "No block reaches {} seats", m.majority.threshold)?;
            for b in blocks {
                writeln!(w, "  {:<12} {:>4}", b.name, b.seats)?;
            }
            for (p, s) in unaligned {
                writeln!(w, "  {:<12} {:>4}", p.as_str(), s)?;
            }
        }
    }
    if let Some(sp) = &m.majority.single_party {
        writeln!(w, "{} holds a majority alone ({} seats)", sp.party, sp.seats)?;
    }
    Ok(())
}

fn seat_list(alloc: &[SeatCount]) -> String {
    if alloc.is_empty() {
        return "-".to_string();
    }
    alloc.iter().map(|s| format!("{} {}", s.party, s.seats)).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::build_model;
    use crate::test_support::scenario;

    #[test]
    fn text_report_has_table_bar_and_verdict() {
        let (out, cfg, digests) = scenario();
        let t = render_text(&build_model(&out, &cfg, &digests, true));

        assert!(t.starts_with("Mini\n"), "{t}");
        assert!(t.contains("projection: literal"));
        assert!(t.contains("AB has an absolute majority: 4 seats (+1)"), "{t}");
        assert!(t.contains("  N (3): A 3"), "{t}");
        assert!(t.contains("\nOutros: other parties\n"), "{t}");

        let bar = t.lines().find(|l| l.starts_with('|')).unwrap();
        assert_eq!(bar.chars().count(), BAR_WIDTH + 2);
        let total_line = t.lines().find(|l| l.starts_with("Total")).unwrap();
        assert!(total_line.trim_end().ends_with('5'));
    }

    #[test]
    fn hung_verdict_lists_blocks() {
        let (out, cfg, digests) = scenario();
        let mut m = build_model(&out, &cfg, &digests, false);
        m.majority.verdict = MajorityVerdict::Hung {
            blocks: vec![hc_pipeline::BlockSeats { name: "AB".into(), seats: 2 }],
            unaligned: vec![(hc_core::PartyId::new("B").unwrap(), 3)],
        };
        let t = render_text(&m);
        assert!(t.contains("No block reaches 3 seats"));
        assert!(t.contains(&format!("  {:<12} {:>4}", "B", 3)), "{t}");
    }
}
