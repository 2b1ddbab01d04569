//! CSV export of an amortization schedule

use std::fs::File;
use std::io::Write;
use std::path::Path;

use super::rows::ScheduleRow;
use crate::error::Result;

const HEADER: [&str; 12] = [
    "Period",
    "DueDate",
    "OpeningBalance",
    "Interest",
    "Principal",
    "LifeInsurance",
    "PropertyInsurance",
    "Fees",
    "PeriodicCosts",
    "Payment",
    "ClosingBalance",
    "Grace",
];

/// Write the schedule as CSV, money columns rounded to 2 decimals
pub fn write_schedule_csv<W: Write>(writer: W, rows: &[ScheduleRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for row in rows {
        csv.write_record([
            row.period.to_string(),
            row.due_date.map(|d| d.to_string()).unwrap_or_default(),
            format!("{:.2}", row.opening_balance),
            format!("{:.2}", row.interest),
            format!("{:.2}", row.principal_paid),
            format!("{:.2}", row.life_insurance),
            format!("{:.2}", row.property_insurance),
            format!("{:.2}", row.fixed_fees),
            format!("{:.2}", row.total_periodic_cost),
            format!("{:.2}", row.total_payment),
            format!("{:.2}", row.closing_balance),
            if row.in_grace { "Y" } else { "N" }.to_string(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

pub fn write_schedule_csv_file<P: AsRef<Path>>(path: P, rows: &[ScheduleRow]) -> Result<()> {
    let file = File::create(path)?;
    write_schedule_csv(file, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{GracePolicy, InsuranceConfig, ScheduleGenerator};

    #[test]
    fn test_csv_layout() {
        let rows = ScheduleGenerator::new(GracePolicy::none(), InsuranceConfig::none(0.0))
            .generate(1_200.0, 0.0, 3);

        let mut buffer = Vec::new();
        write_schedule_csv(&mut buffer, &rows).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Period,DueDate,OpeningBalance"));
        assert_eq!(
            lines[1],
            "1,,1200.00,0.00,400.00,0.00,0.00,0.00,0.00,400.00,800.00,N"
        );
        assert!(lines[3].ends_with(",0.00,N"));
    }
}
