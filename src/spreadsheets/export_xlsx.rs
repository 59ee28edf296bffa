use rust_xlsxwriter::Workbook;

use crate::domain::ryokan::Ryokan;
use crate::errors::PipelineError;

/// Renders the catalog as a spreadsheet. Presentation only: the CSV stays
/// the canonical artifact, so booleans read Yes/No here and missing
/// coordinates stay blank.
pub fn export_catalog_xlsx(records: &[Ryokan], path: &std::path::Path) -> Result<(), PipelineError> {
    let xe = |e: rust_xlsxwriter::XlsxError| PipelineError::Xlsx(e.to_string());

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let headers = [
        "Name",
        "Address",
        "Price Min",
        "Price Max",
        "Open-air Rooms",
        "Rental Open-air",
        "Rental Indoor",
        "Rental Both",
        "Rating",
        "Tags",
        "Description",
        "Transportation",
        "Latitude",
        "Longitude",
        "URL",
    ];
    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header).map_err(xe)?;
    }

    for (i, r) in records.iter().enumerate() {
        let row = (i + 1) as u32;

        worksheet.write_string(row, 0, &r.name).map_err(xe)?;
        worksheet.write_string(row, 1, &r.address).map_err(xe)?;
        worksheet
            .write_number(row, 2, r.price_min as f64)
            .map_err(xe)?;
        worksheet
            .write_number(row, 3, r.price_max as f64)
            .map_err(xe)?;
        worksheet
            .write_number(row, 4, r.rooms_open_air as f64)
            .map_err(xe)?;
        worksheet
            .write_string(row, 5, yes_no(r.rental_open_air))
            .map_err(xe)?;
        worksheet
            .write_string(row, 6, yes_no(r.rental_indoor))
            .map_err(xe)?;
        worksheet
            .write_string(row, 7, yes_no(r.rental_both))
            .map_err(xe)?;
        worksheet.write_number(row, 8, r.rating).map_err(xe)?;
        worksheet
            .write_string(row, 9, &r.tags.join(", "))
            .map_err(xe)?;
        worksheet.write_string(row, 10, &r.description).map_err(xe)?;
        worksheet
            .write_string(row, 11, &r.transportation)
            .map_err(xe)?;
        if let (Some(lat), Some(lon)) = (r.lat, r.lon) {
            worksheet.write_number(row, 12, lat).map_err(xe)?;
            worksheet.write_number(row, 13, lon).map_err(xe)?;
        }
        worksheet.write_string(row, 14, &r.url).map_err(xe)?;
    }

    workbook.save(path).map_err(xe)
}

fn yes_no(v: bool) -> &'static str {
    if v {
        "Yes"
    } else {
        "No"
    }
}
