use anyhow::{Context, Result, anyhow};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::error::ExtractError;
use super::table::{HeaderList, RawCell};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlTable {
    pub headers: HeaderList,
    pub rows: Vec<Vec<RawCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServicePage {
    pub prefix: String,
    pub tables: Vec<HtmlTable>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceLink {
    pub name: String,
    pub url: String,
}

/// Locates the service listing and the per-service tables in reference pages.
pub struct PageParser {
    index_list: Selector,
    link: Selector,
    prefix: Selector,
    table: Selector,
    thead_header: Selector,
    header_cell: Selector,
    row: Selector,
    data_cell: Selector,
}

impl PageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            index_list: compile("div.highlights ul")?,
            link: compile("a")?,
            prefix: compile("div#main-col-body code")?,
            table: compile("table")?,
            thead_header: compile("thead th")?,
            header_cell: compile("th")?,
            row: compile("tr")?,
            data_cell: compile("td")?,
        })
    }

    pub fn parse_service_index(&self, html: &str, base_url: &str) -> Result<Vec<ServiceLink>> {
        let base = Url::parse(base_url).with_context(|| format!("invalid index url: {base_url}"))?;
        let document = Html::parse_document(html);

        let list = document
            .select(&self.index_list)
            .next()
            .with_context(|| format!("no service list (div.highlights ul) on {base_url}"))?;

        let mut links = Vec::new();
        for anchor in list.select(&self.link) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let url = base
                .join(href)
                .with_context(|| format!("invalid service link: {href}"))?;
            links.push(ServiceLink {
                name: element_text(anchor),
                url: url.to_string(),
            });
        }

        Ok(links)
    }

    pub fn parse_service_page(&self, html: &str) -> Result<ServicePage, ExtractError> {
        let document = Html::parse_document(html);

        let prefix = document
            .select(&self.prefix)
            .next()
            .map(element_text)
            .filter(|prefix| !prefix.is_empty())
            .ok_or(ExtractError::PrefixMissing)?;

        let tables = document
            .select(&self.table)
            .map(|table| self.read_table(table))
            .collect();

        Ok(ServicePage { prefix, tables })
    }

    fn read_table(&self, table: ElementRef<'_>) -> HtmlTable {
        let mut headers = table
            .select(&self.thead_header)
            .map(element_text)
            .collect::<Vec<String>>();
        if headers.is_empty()
            && let Some(first_row) = table.select(&self.row).next()
        {
            headers = first_row.select(&self.header_cell).map(element_text).collect();
        }

        let rows = table
            .select(&self.row)
            .skip(1)
            .map(|row| {
                row.select(&self.data_cell)
                    .map(|cell| {
                        let row_span = cell
                            .value()
                            .attr("rowspan")
                            .and_then(|value| value.trim().parse::<usize>().ok())
                            .unwrap_or(1);
                        RawCell::spanning(cell.text().collect::<String>(), row_span)
                    })
                    .collect()
            })
            .collect();

        HtmlTable { headers, rows }
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| anyhow!("failed to compile selector {selector}: {err:?}"))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
