//! Dashboard rendering

use expenseweb_core::{ChartData, DashboardData, Transaction};
use expenseweb_utils::{escape_html, format_amount};

/// Dashboard body: actions, charts, and the self-refreshing list
pub fn render_dashboard(data: &DashboardData, decimal_places: usize) -> String {
    let greeting = match &data.user {
        Some(user) if !user.id.is_empty() => format!("<p class='text-sm text-gray-500'>Signed in as {}</p>", escape_html(&user.id)),
        _ => String::new(),
    };

    format!(
        r#"<div class='mb-6 flex items-center justify-between'>
            <div><h2 class='text-2xl font-bold'>Dashboard</h2>{}</div>
            <div class='flex items-center gap-2'>
                <button hx-get='/transactions/add' hx-target='#modal-container' hx-swap='beforeend' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Add Transaction</button>
                <button hx-get='/banks/link' hx-target='#modal-container' hx-swap='beforeend' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Link Bank Account</button>
                <button hx-post='/banks/refresh' hx-target='#bank-status' hx-swap='innerHTML' hx-disabled-elt='this' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Refresh Link Status</button>
                <button hx-get='/banks/import' hx-target='#modal-container' hx-swap='beforeend' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Import Transactions</button>
            </div>
        </div>
        <div id='bank-status' class='mb-4'></div>
        {}
        <div class='bg-white rounded-xl shadow-sm p-6 mt-6'>
            <h3 class='text-lg font-semibold mb-4'>Transactions</h3>
            <div id='transaction-list' hx-get='/transactions/list' hx-trigger='transactions-changed from:body' hx-swap='innerHTML'>{}</div>
        </div>"#,
        greeting,
        render_charts(&data.chart_data),
        render_transaction_list(&data.transactions(), decimal_places)
    )
}

/// Transaction rows with an Edit button each
pub fn render_transaction_list(transactions: &[Transaction], decimal_places: usize) -> String {
    if transactions.is_empty() {
        return "<p class='text-gray-500'>No transactions yet.</p>".to_string();
    }

    let rows: Vec<String> = transactions
        .iter()
        .map(|tx| render_row(tx, decimal_places))
        .collect();
    format!("<ul class='divide-y'>{}</ul>", rows.join(""))
}

fn render_row(tx: &Transaction, decimal_places: usize) -> String {
    let date = tx.booking_date.as_deref().unwrap_or("(pending)");
    let date_class = if tx.is_pending() { "font-medium italic text-amber-600" } else { "font-medium" };
    let category = tx.category.as_deref().unwrap_or("Uncategorized");
    let sub_category = tx.sub_category.as_deref().unwrap_or("(none)");
    let amount = format_amount(tx.amount.value, &tx.amount.currency, decimal_places);

    let mut parties = String::new();
    if let Some(debtor) = &tx.debtor_name {
        parties.push_str(&format!("<span>From: {}</span>", escape_html(debtor)));
    }
    if let Some(creditor) = &tx.creditor_name {
        parties.push_str(&format!("<span>To: {}</span>", escape_html(creditor)));
    }

    let description = tx
        .remittance_info
        .as_deref()
        .map(|r| format!("<p class='text-sm text-gray-600'>{}</p>", escape_html(r)))
        .unwrap_or_default();

    // Rows without an id cannot be edited
    let edit_button = match &tx.id {
        Some(id) => format!(
            "<button hx-get='/transactions/{}/edit' hx-target='#modal-container' hx-swap='beforeend' class='px-3 py-1 text-sm text-indigo-600 border border-indigo-200 rounded-lg hover:bg-indigo-50'>Edit</button>",
            escape_html(&urlencoding::encode(id))
        ),
        None => String::new(),
    };

    format!(
        r#"<li class='py-3 flex items-start justify-between gap-4'>
            <div>
                <p><span class='{}'>{}</span> <span class='text-gray-500'>{}</span> <span class='text-xs uppercase text-gray-400'>{}</span></p>
                <p class='text-sm'>{} / {}</p>
                {}
                <p class='text-xs text-gray-500 flex gap-3'>{}</p>
            </div>
            {}
        </li>"#,
        date_class,
        escape_html(date),
        escape_html(&amount),
        tx.transaction_type,
        escape_html(category),
        escape_html(sub_category),
        description,
        parties,
        edit_button
    )
}

/// Pie (expenses by category) and stacked bar (by category per month)
pub fn render_charts(chart_data: &ChartData) -> String {
    if chart_data.is_empty() {
        return "<div class='bg-white rounded-xl shadow-sm p-6'><p class='text-gray-500'>No chart data available.</p></div>".to_string();
    }

    let json = serde_json::to_string(chart_data)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");

    format!(
        r#"<div class='grid grid-cols-1 lg:grid-cols-2 gap-6'>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Expenses by Category</h3>
                <canvas id='pie-chart'></canvas>
            </div>
            <div class='bg-white rounded-xl shadow-sm p-6'>
                <h3 class='text-lg font-semibold mb-4'>Monthly Expenses by Category</h3>
                <canvas id='bar-chart'></canvas>
            </div>
        </div>
        <script>
        (function() {{
            const chartData = {};
            if (typeof Chart === 'undefined') return;
            new Chart(document.getElementById('pie-chart'), {{
                type: 'pie',
                data: {{ labels: chartData.categories, datasets: [{{ data: chartData.amounts }}] }}
            }});
            new Chart(document.getElementById('bar-chart'), {{
                type: 'bar',
                data: {{ labels: chartData.dates, datasets: chartData.categoryData }},
                options: {{ scales: {{ x: {{ stacked: true }}, y: {{ stacked: true }} }} }}
            }});
        }})();
        </script>"#,
        json
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use expenseweb_core::{Amount, CategoryDataset, TransactionType};

    #[test]
    fn test_row_placeholders() {
        let tx = Transaction {
            id: Some("a b".to_string()),
            amount: Amount { value: 1234.5, currency: "EUR".to_string() },
            transaction_type: TransactionType::Income,
            ..Default::default()
        };
        let html = render_transaction_list(&[tx], 2);

        assert!(html.contains("<span class='font-medium italic text-amber-600'>(pending)</span>"));
        assert!(html.contains("Uncategorized / (none)"));
        assert!(html.contains("1,234.50 EUR"));
        assert!(html.contains("income"));
        assert!(html.contains("/transactions/a%20b/edit"));
    }

    #[test]
    fn test_booked_row_shows_date() {
        let tx = Transaction {
            booking_date: Some("2024-03-02".to_string()),
            ..Default::default()
        };
        let html = render_transaction_list(&[tx], 2);

        assert!(html.contains("<span class='font-medium'>2024-03-02</span>"));
        assert!(!html.contains("(pending)"));
    }

    #[test]
    fn test_row_escapes_text() {
        let tx = Transaction {
            remittance_info: Some("<script>alert(1)</script>".to_string()),
            creditor_name: Some("Tom & Co".to_string()),
            ..Default::default()
        };
        let html = render_transaction_list(&[tx], 2);

        assert!(!html.contains("<script>"));
        assert!(html.contains("To: Tom &amp; Co"));
        assert!(!html.contains("Edit</button>"));
    }

    #[test]
    fn test_empty_charts() {
        assert!(render_charts(&ChartData::default()).contains("No chart data available."));
    }

    #[test]
    fn test_charts_embed_data() {
        let data = ChartData {
            categories: vec!["Food".to_string()],
            amounts: vec![12.0],
            dates: vec!["March 2024".to_string()],
            category_data: vec![CategoryDataset {
                label: "Food</script>".to_string(),
                data: vec![12.0],
                background_color: "#ff6384".to_string(),
            }],
        };
        let html = render_charts(&data);

        assert!(html.contains("\"categoryData\""));
        assert!(html.contains("\"backgroundColor\":\"#ff6384\""));
        assert!(html.contains("Food<\\/script>"));
    }
}
