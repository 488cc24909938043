use super::{ChartSnapshot, DashboardSnapshot, ExportError, FormatHandler};
use crate::dashboard::chart::ChartSubtype;
use rust_xlsxwriter::{
    Chart, ChartPoint, ChartSolidFill, ChartType, Color, Format, FormatBorder, Workbook,
    Worksheet,
};

const SUMMARY_SHEET: &str = "Summary";
const CHART_SHEET: &str = "Charts";
/// チャート1つ分のブロック高さ（行）
const BLOCK_ROWS: u32 = 18;

/// Excel形式エクスポーター
///
/// 生存中の各スロットについてデータ表とネイティブチャートを1つずつ出力する。
pub struct WorkbookExporter {
    cell_formatting: bool,
}

impl WorkbookExporter {
    pub fn new() -> Self {
        Self {
            cell_formatting: true,
        }
    }

    pub fn with_cell_formatting(mut self, cell_formatting: bool) -> Self {
        self.cell_formatting = cell_formatting;
        self
    }

    fn header_format(&self) -> Option<Format> {
        self.cell_formatting.then(|| {
            Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0x4472C4))
                .set_font_color(Color::White)
                .set_border(FormatBorder::Thin)
        })
    }

    fn write_header(
        &self,
        worksheet: &mut Worksheet,
        row: u32,
        headers: &[&str],
    ) -> Result<(), ExportError> {
        let format = self.header_format();
        for (col, header) in headers.iter().enumerate() {
            match &format {
                Some(format) => {
                    worksheet.write_string_with_format(row, col as u16, *header, format)?;
                }
                None => {
                    worksheet.write_string(row, col as u16, *header)?;
                }
            }
        }
        Ok(())
    }

    /// テキスト欄のシート
    fn create_summary_sheet(
        &self,
        workbook: &mut Workbook,
        snapshot: &DashboardSnapshot,
    ) -> Result<(), ExportError> {
        let worksheet = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
        worksheet.set_column_width(0, 60)?;

        self.write_header(worksheet, 0, &["Dashboard"])?;
        for (i, line) in snapshot.text.lines().iter().enumerate() {
            worksheet.write_string(i as u32 + 1, 0, line)?;
        }

        let footer_row = snapshot.text.lines().len() as u32 + 2;
        worksheet.write_string(
            footer_row,
            0,
            format!("Generated at {}", snapshot.generated_at.to_rfc3339()),
        )?;
        Ok(())
    }

    /// チャートのシート
    fn create_chart_sheet(
        &self,
        workbook: &mut Workbook,
        snapshot: &DashboardSnapshot,
    ) -> Result<(), ExportError> {
        let worksheet = workbook.add_worksheet().set_name(CHART_SHEET)?;
        worksheet.set_column_width(0, 20)?;
        worksheet.set_column_width(2, 12)?;

        for (index, chart) in snapshot.charts.iter().enumerate() {
            let top = index as u32 * BLOCK_ROWS;
            self.write_chart_block(worksheet, top, chart)?;
        }
        Ok(())
    }

    fn write_chart_block(
        &self,
        worksheet: &mut Worksheet,
        top: u32,
        snapshot: &ChartSnapshot,
    ) -> Result<(), ExportError> {
        worksheet.write_string(top, 0, format!("{} [{}]", snapshot.title, snapshot.subtype))?;
        let value_header = snapshot.dataset_label.as_deref().unwrap_or("Count");
        self.write_header(worksheet, top + 1, &["Category", value_header, "Color"])?;

        let colors = snapshot
            .colors
            .iter()
            .map(|hex| parse_hex(hex))
            .collect::<Result<Vec<u32>, ExportError>>()?;

        let first_row = top + 2;
        for (offset, ((label, value), rgb)) in snapshot
            .labels
            .iter()
            .zip(snapshot.data.iter())
            .zip(colors.iter())
            .enumerate()
        {
            let row = first_row + offset as u32;
            worksheet.write_string(row, 0, label)?;
            worksheet.write_number(row, 1, *value as f64)?;
            if self.cell_formatting {
                let swatch = Format::new().set_background_color(Color::RGB(*rgb));
                worksheet.write_string_with_format(row, 2, &snapshot.colors[offset], &swatch)?;
            } else {
                worksheet.write_string(row, 2, &snapshot.colors[offset])?;
            }
        }
        let last_row = first_row + snapshot.data.len().saturating_sub(1) as u32;

        let points: Vec<ChartPoint> = colors
            .iter()
            .map(|rgb| ChartPoint::new().set_format(ChartSolidFill::new().set_color(Color::RGB(*rgb))))
            .collect();

        let mut chart = Chart::new(chart_type(snapshot.subtype));
        chart.title().set_name(snapshot.title.as_str());
        chart
            .add_series()
            .set_name((CHART_SHEET, top + 1, 1))
            .set_categories((CHART_SHEET, first_row, 0, last_row, 0))
            .set_values((CHART_SHEET, first_row, 1, last_row, 1))
            .set_points(&points);

        worksheet.insert_chart(top, 4, &chart)?;
        Ok(())
    }
}

impl Default for WorkbookExporter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatHandler for WorkbookExporter {
    fn export(&self, snapshot: &DashboardSnapshot) -> Result<Vec<u8>, ExportError> {
        if snapshot.is_empty() {
            return Err(ExportError::Empty {
                message: "no chart or summary has been rendered yet".to_string(),
            });
        }

        let mut workbook = Workbook::new();
        self.create_summary_sheet(&mut workbook, snapshot)?;
        if !snapshot.charts.is_empty() {
            self.create_chart_sheet(&mut workbook, snapshot)?;
        }

        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| ExportError::Serialization(format!("Excel generation failed: {}", e)))?;
        Ok(buffer)
    }

    fn file_extension(&self) -> &str {
        "xlsx"
    }
}

/// チャート種別をExcelのチャート種別へ（棒は縦棒）
fn chart_type(subtype: ChartSubtype) -> ChartType {
    match subtype {
        ChartSubtype::Pie => ChartType::Pie,
        ChartSubtype::Doughnut => ChartType::Doughnut,
        ChartSubtype::Bar => ChartType::Column,
    }
}

fn parse_hex(hex: &str) -> Result<u32, ExportError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    u32::from_str_radix(digits, 16)
        .map_err(|e| ExportError::Serialization(format!("invalid color '{}': {}", hex, e)))
}
