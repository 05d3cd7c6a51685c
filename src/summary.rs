/// Assembly of the day's summary record.
///
/// Pure packaging: every value has already been computed and validated by
/// the aggregator, smoother and corrector.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::analysis::correction::CorrectedDay;
use crate::model::SummaryRecord;
use crate::stations::Station;

pub fn build(
    station: &Station,
    date: NaiveDate,
    corrected: &CorrectedDay,
    weight_temp: Option<Decimal>,
) -> SummaryRecord {
    SummaryRecord {
        station_name: station.name.clone(),
        date,
        temp: corrected.temp,
        adjusted_temp: corrected.adjusted_temp,
        weight_temp,
        max_temp: corrected.max_temp,
        min_temp: corrected.min_temp,
        pressure: corrected.pressure,
        city: station.city.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::correction::CorrectionRule;

    #[test]
    fn test_build_copies_every_field() {
        let station = Station {
            station_id: "466880".to_string(),
            name: "Banqiao".to_string(),
            city: "New Taipei".to_string(),
        };
        let corrected = CorrectedDay {
            temp: Some(Decimal::new(300, 1)),
            adjusted_temp: Some(Decimal::new(240, 1)),
            max_temp: Some(Decimal::new(330, 1)),
            min_temp: Some(Decimal::new(270, 1)),
            pressure: Some(Decimal::new(10088, 1)),
            rule: CorrectionRule::Blended { delta: Decimal::new(120, 1) },
        };
        let date = NaiveDate::from_ymd_opt(2025, 11, 15).unwrap();

        let record = build(&station, date, &corrected, Some(Decimal::new(215, 1)));

        assert_eq!(record.station_name, "Banqiao");
        assert_eq!(record.date, date);
        assert_eq!(record.temp, Some(Decimal::new(300, 1)));
        assert_eq!(record.adjusted_temp, Some(Decimal::new(240, 1)));
        assert_eq!(record.weight_temp, Some(Decimal::new(215, 1)));
        assert_eq!(record.max_temp, Some(Decimal::new(330, 1)));
        assert_eq!(record.min_temp, Some(Decimal::new(270, 1)));
        assert_eq!(record.pressure, Some(Decimal::new(10088, 1)));
        assert_eq!(record.city, "New Taipei");
    }
}
