use contract_crawler::{BrowserSession, CrawlConfig, CrawlError, LaunchOptions, View,
                       crawl::{Advance, FieldExtractor, Paginator, Readiness, RowEnumerator, RowLinks, TableMonitor,
                               VisitedSet}};

/// A table that renders client-side, after a delay, and re-renders in place on "next"
const TABLE_HTML: &str = r##"
<html>
<body>
    <table><tbody id="rows"></tbody></table>
    <div class="mobile-only" style="display: none">
        <a href="#/palmeira/portal/compras/contratoView/1">hidden duplicate</a>
    </div>
    <ul class="pagination"><li><a class="pagination-next" href="javascript:void(0)">Próxima</a></li></ul>
    <script>
        const pages = [[1, 2, 3], [4]];
        let current = 0;
        function render() {
            document.getElementById('rows').innerHTML = pages[current]
                .map(n => `<tr><td>${n}/2024</td><td><a href="#/palmeira/portal/compras/contratoView/${n}">Ver</a></td></tr>`)
                .join('');
            document.querySelector('.pagination-next').className =
                current + 1 < pages.length ? 'pagination-next' : 'pagination-next disabled';
        }
        document.querySelector('.pagination-next').addEventListener('click', () => {
            if (current + 1 < pages.length) {
                current += 1;
                setTimeout(render, 300);
            }
        });
        setTimeout(render, 300);
    </script>
</body>
</html>
"##;

/// A cookie banner sits on top of the pager
const COVERED_PAGER_HTML: &str = r##"
<html>
<body>
    <table><tbody id="rows"><tr><td><a href="#/palmeira/portal/compras/contratoView/1">Ver</a></td></tr></tbody></table>
    <ul class="pagination"><li><a class="pagination-next" href="javascript:void(0)">Próxima</a></li></ul>
    <div style="position: fixed; inset: 0; z-index: 10; background: rgba(0, 0, 0, 0.4)">Aceitar cookies</div>
    <script>
        document.querySelector('.pagination-next').addEventListener('click', () => {
            document.getElementById('rows').innerHTML =
                '<tr><td><a href="#/palmeira/portal/compras/contratoView/2">Ver</a></td></tr>';
            document.querySelector('.pagination-next').className = 'pagination-next disabled';
        });
    </script>
</body>
</html>
"##;

const DETAIL_HTML: &str = r#"
<html>
<body>
    <h2>Dados do contrato</h2>
    <dl>
        <dt>Contrato</dt><dd>Contrato 123.456-7</dd>
        <dt>Valor</dt><dd>Valor total R$ 1.234,56</dd>
    </dl>
</body>
</html>
"#;

fn data_url(html: &str) -> String {
    format!("data:text/html,{}", urlencoding::encode(html))
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_paginate_client_rendered_table() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    let view = session.primary_view().expect("Failed to get table view");
    view.navigate(&data_url(TABLE_HTML)).expect("Failed to navigate");

    let config = CrawlConfig::default();
    let monitor = TableMonitor::from_config(&config);
    let enumerator = RowEnumerator::new(RowLinks::from_config(&config));
    let paginator = Paginator::from_config(&config);
    let mut visited = VisitedSet::new();

    assert_eq!(monitor.wait_until_ready(&view), Readiness::RowsVisible);
    let first = enumerator.enumerate_new_rows(&view, &visited).expect("Failed to enumerate rows");
    let tokens: Vec<&str> = first.iter().map(|row| row.token.as_str()).collect();
    assert_eq!(tokens, vec![
        "#/palmeira/portal/compras/contratoView/1",
        "#/palmeira/portal/compras/contratoView/2",
        "#/palmeira/portal/compras/contratoView/3",
    ]);
    assert!(first[0].text.contains("1/2024"));
    visited.extend(first.into_iter().map(|row| row.token));

    assert_eq!(paginator.advance(&view).expect("Failed to advance"), Advance::Advanced);
    let second = enumerator.enumerate_new_rows(&view, &visited).expect("Failed to enumerate rows");
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].token, "#/palmeira/portal/compras/contratoView/4");

    assert_eq!(paginator.advance(&view).expect("Failed to advance"), Advance::Disabled);
}

#[test]
#[ignore]
fn test_covered_pager_falls_back_to_dispatched_click() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    let view = session.primary_view().expect("Failed to get table view");
    view.navigate(&data_url(COVERED_PAGER_HTML)).expect("Failed to navigate");

    let config = CrawlConfig::default();
    let clicked = view.click(&config.next_selector);
    assert!(matches!(clicked, Err(CrawlError::InteractionFailed { .. })));

    let paginator = Paginator::from_config(&config);
    assert_eq!(paginator.advance(&view).expect("Failed to advance"), Advance::Advanced);
}

#[test]
#[ignore]
fn test_extract_detail_fields() {
    let session = BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser");
    let view = session.primary_view().expect("Failed to get view");
    view.navigate(&data_url(DETAIL_HTML)).expect("Failed to navigate");

    let extractor = FieldExtractor::from_config(&CrawlConfig::default()).expect("Failed to build extractor");
    let record = extractor.extract(&view).expect("Failed to extract");

    assert_eq!(record.contract.as_deref(), Some("123.456-7"));
    assert_eq!(record.amount.as_deref(), Some("1.234,56"));
}
