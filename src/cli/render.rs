//! Turns engine replies into terminal messages.

use crate::{
    cli::{
        output::MessageKind,
        table::{Table, TableColumn},
    },
    core::{
        report::{DetailView, ReportComposer},
        router::CONTROL_LABELS,
        Reply, Resolution,
    },
};

pub type Message = (MessageKind, String);

pub fn render_reply(reply: &Reply, composer: &ReportComposer) -> Vec<Message> {
    let currency = &composer.settings().currency;
    match reply {
        Reply::Recorded(expense) => vec![(
            MessageKind::Success,
            format!("Recorded #{}: {}", expense.id, expense.summary(currency)),
        )],
        Reply::Summary(view) => vec![(MessageKind::Body, composer.summary_text(view))],
        Reply::History(view) => history(view, currency),
        Reply::DeletionList {
            period,
            candidates,
            truncated,
        } => {
            if candidates.is_empty() {
                return vec![(
                    MessageKind::Info,
                    format!("Nothing to delete for {}.", period.label()),
                )];
            }
            let mut table = Table::new(vec![
                TableColumn::left("Token"),
                TableColumn::left("Entry").max(48),
            ]);
            for candidate in candidates {
                table.push(vec![format!("del_{}", candidate.id), candidate.label.clone()]);
            }
            let mut out = vec![
                (MessageKind::Section, format!("Delete an entry ({})", period.label())),
                (MessageKind::Body, table.render()),
            ];
            if *truncated {
                out.push((
                    MessageKind::Hint,
                    format!("Only the {} most recent entries are listed.", candidates.len()),
                ));
            }
            out.push((
                MessageKind::Hint,
                "Send a token to delete it, or `cancel_delete`.".into(),
            ));
            out
        }
        Reply::Deletion(Resolution::Deleted(expense)) => vec![(
            MessageKind::Success,
            format!("Deleted #{}: {}", expense.id, expense.summary(currency)),
        )],
        Reply::Deletion(Resolution::NotFound(id)) => vec![(
            MessageKind::Warning,
            format!("Entry #{id} was not found; nothing deleted."),
        )],
        Reply::Deletion(Resolution::Cancelled) => {
            vec![(MessageKind::Info, "Deletion cancelled.".into())]
        }
        Reply::ClearPrompt { entries } => vec![
            (
                MessageKind::Warning,
                format!("This removes all {entries} entries and cannot be undone."),
            ),
            (
                MessageKind::Hint,
                "Send `confirm_clear` to proceed or `cancel_clear` to keep them.".into(),
            ),
        ],
        Reply::Cleared { removed } => vec![(
            MessageKind::Success,
            format!("All data cleared ({removed} entries removed)."),
        )],
        Reply::ClearCancelled => vec![(MessageKind::Info, "Clear cancelled.".into())],
        Reply::Report { payload, rendered } => {
            let mut out = vec![(
                MessageKind::Success,
                format!(
                    "Report for {}: {} entries, {:.2} {currency}",
                    payload.period.label(),
                    payload.entry_count,
                    payload.grand_total
                ),
            )];
            if let Some(rendered) = rendered {
                out.push((
                    MessageKind::Info,
                    format!("Saved to {}", rendered.location.display()),
                ));
            }
            out
        }
        Reply::Help => vec![(MessageKind::Body, help_text())],
        Reply::Version(info) => vec![(MessageKind::Body, info.to_string())],
        Reply::UsageError(message) => vec![(MessageKind::Warning, message.clone())],
        Reply::Failure(message) => vec![(MessageKind::Error, message.clone())],
    }
}

fn history(view: &DetailView, currency: &str) -> Vec<Message> {
    if view.is_empty() {
        return vec![(
            MessageKind::Info,
            format!("No records for {}.", view.period.label()),
        )];
    }
    let mut table = Table::new(vec![
        TableColumn::right("#"),
        TableColumn::left("Date"),
        TableColumn::left("Description"),
        TableColumn::left("Category"),
        TableColumn::right("Amount"),
    ]);
    for row in &view.rows {
        table.push(vec![
            row.id.to_string(),
            row.date.clone(),
            row.description.clone(),
            row.category.clone(),
            format!("{:.2}", row.amount),
        ]);
    }

    let mut out = vec![
        (MessageKind::Section, format!("History ({})", view.period.label())),
        (MessageKind::Body, table.render()),
        (
            MessageKind::Info,
            format!(
                "{} entries, {:.2} {currency} in total",
                view.total_entries, view.total_amount
            ),
        ),
    ];
    if view.hidden() > 0 {
        out.push((
            MessageKind::Hint,
            format!("{} older entries not shown.", view.hidden()),
        ));
    }
    out
}

pub fn help_text() -> String {
    let mut text = String::from(
        "Send an expense as `<amount> [description]`, e.g. `500 обед`.\n\n\
         Commands:\n  \
         /stats [today|week|month|all]    totals by category\n  \
         /history [period]                recent entries\n  \
         /delete [period]                 pick an entry to delete\n  \
         /pdf [period]                    export a report\n  \
         /clear                           remove everything (asks first)\n  \
         /version                         build information\n  \
         exit                             leave the session\n\n\
         Menu captions:",
    );
    for label in CONTROL_LABELS {
        text.push_str("\n  ");
        text.push_str(label);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewExpense, Period};
    use chrono::NaiveDate;

    #[test]
    fn recorded_reply_mentions_category() {
        let ts = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let expense = NewExpense::new(500.0, "обед", "Еда", ts).into_expense(4);
        let lines = render_reply(&Reply::Recorded(expense), &ReportComposer::default());
        assert_eq!(lines[0].0, MessageKind::Success);
        assert_eq!(lines[0].1, "Recorded #4: 500.00 ₽ · обед (Еда)");
    }

    #[test]
    fn empty_deletion_list_is_informational() {
        let reply = Reply::DeletionList {
            period: Period::Today,
            candidates: Vec::new(),
            truncated: false,
        };
        let lines = render_reply(&reply, &ReportComposer::default());
        assert_eq!(lines, vec![(MessageKind::Info, "Nothing to delete for today.".into())]);
    }

    #[test]
    fn help_lists_menu_captions() {
        let help = help_text();
        assert!(CONTROL_LABELS.iter().all(|label| help.contains(label)));
    }
}
