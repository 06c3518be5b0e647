pub mod input;
pub mod printer;

use anyhow::Result;
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::terminal::input::{MENU, MenuChoice, prompt_line};
use crate::terminal::printer::{
    print_compact, print_error, print_run_report, print_success, print_verbose,
};
use crate::unsubscribe::registry::{Registry, Selection};
use crate::unsubscribe::runner::ActionRunner;

/// Menu loop over the found emailers. Returns when the registry is empty,
/// the user exits, input ends or `cancel` is set.
pub fn run_menu(
    input: &mut impl BufRead,
    registry: &mut Registry,
    runner: &ActionRunner<'_>,
    cancel: &AtomicBool,
) -> Result<()> {
    while !registry.is_empty() && !cancel.load(Ordering::SeqCst) {
        let Some(choice) = prompt_line(input, MENU)? else {
            break;
        };

        match choice.parse::<MenuChoice>() {
            Ok(MenuChoice::UnsubscribeAll) => unsubscribe(registry, runner, Selection::All),
            Ok(MenuChoice::UnsubscribeSome) => {
                let Some(raw) = prompt_line(
                    input,
                    "Enter the emailer number or range (e.g. '1-10') of numbers whom which you would like to unsubscribe from: ",
                )?
                else {
                    break;
                };
                match raw.parse::<Selection>() {
                    Ok(selection) => unsubscribe(registry, runner, selection),
                    Err(e) => print_error(&e.to_string()),
                }
            }
            Ok(MenuChoice::PrintCompact) => print_compact(registry),
            Ok(MenuChoice::PrintVerbose) => print_verbose(registry),
            Ok(MenuChoice::Exit) => break,
            Err(e) => print_error(&e.to_string()),
        }
    }

    if registry.is_empty() {
        print_success("\nNo emailers left to unsubscribe from.");
    }
    print_success("\nGoodbye!");
    Ok(())
}

fn unsubscribe(registry: &mut Registry, runner: &ActionRunner<'_>, selection: Selection) {
    match runner.run_selection(registry, selection, print_run_report) {
        Ok(reports) => {
            let saved: usize = reports.iter().map(|r| r.saved()).sum();
            print_success(&format!(
                "\nProcessed {} emailer(s), saved {} response(s).",
                reports.len(),
                saved
            ));
        }
        Err(e) => print_error(&e.to_string()),
    }
}
