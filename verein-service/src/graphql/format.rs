//! Display formatting applied when GraphQL fields are resolved

/// Render a member count for display
///
/// The short form abbreviates thousands (`300k`, `1.5k`), the long form
/// groups digits and names the unit (`300,000 members`).
pub fn format_member_count(count: u32, short: bool) -> String {
    if short {
        abbreviate(count)
    } else {
        let unit = if count == 1 { "member" } else { "members" };
        format!("{} {unit}", group_thousands(count))
    }
}

fn abbreviate(count: u32) -> String {
    const STEPS: [(u32, &str); 2] = [(1_000_000, "M"), (1_000, "k")];

    for (step, suffix) in STEPS {
        if count >= step {
            let whole = count / step;
            let tenth = (count % step) / (step / 10);
            return if tenth == 0 {
                format!("{whole}{suffix}")
            } else {
                format!("{whole}.{tenth}{suffix}")
            };
        }
    }
    count.to_string()
}

fn group_thousands(count: u32) -> String {
    let digits = count.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
