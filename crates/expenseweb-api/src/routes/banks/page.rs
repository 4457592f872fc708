//! Bank modal rendering

use expenseweb_config::BankLinkConfig;
use expenseweb_utils::escape_html;

const INPUT_CLASS: &str = "w-full px-3 py-2.5 border rounded-lg focus:ring-2 focus:ring-indigo-500";

/// Scopes a bank agreement can grant
pub const ACCESS_SCOPES: [&str; 3] = ["balances", "transactions", "details"];

fn modal(modal_id: &str, title: &str, body: &str) -> String {
    format!(
        r#"<div id='{id}' class='fixed inset-0 bg-black bg-opacity-40 flex items-center justify-center z-50'>
    <div class='bg-white rounded-xl shadow-lg p-6 w-full max-w-lg'>
        <div class='flex items-center justify-between mb-4'>
            <h3 class='text-lg font-semibold'>{title}</h3>
            <button type='button' onclick="document.getElementById('{id}').remove()" class='text-gray-400 hover:text-gray-600'>✕</button>
        </div>
        {body}
    </div>
</div>"#,
        id = modal_id,
        title = title,
        body = body
    )
}

/// Link-bank form prefilled with the configured defaults
pub fn render_link_modal(defaults: &BankLinkConfig) -> String {
    let scopes: String = ACCESS_SCOPES
        .iter()
        .map(|scope| {
            let checked = defaults.access_scope.iter().any(|s| s == scope);
            format!(
                "<label class='flex items-center gap-2'><input type='checkbox' name='access_scope' value='{0}' {1}><span>{0}</span></label>",
                scope,
                if checked { "checked" } else { "" }
            )
        })
        .collect();

    let body = format!(
        r#"<form hx-post='/banks/link' hx-target='#link-result' hx-swap='innerHTML' hx-disabled-elt='find button[type=submit]'>
            <div class='space-y-4'>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>Institution ID</label><input type='text' name='institution_id' value='{}' class='{cls}'></div>
                <div class='grid grid-cols-2 gap-4'>
                    <div><label class='block text-sm font-medium text-gray-700 mb-1'>Max Historical Days</label><input type='number' min='1' name='max_historical_days' value='{}' class='{cls}'></div>
                    <div><label class='block text-sm font-medium text-gray-700 mb-1'>Access Valid For Days</label><input type='number' min='1' name='access_valid_for_days' value='{}' class='{cls}'></div>
                </div>
                <div><span class='block text-sm font-medium text-gray-700 mb-1'>Access Scope</span><div class='flex gap-4'>{}</div></div>
            </div>
            <div id='link-result' class='mt-4'></div>
            <div class='flex items-center gap-4 mt-6 pt-4 border-t'>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700 disabled:opacity-50'>Link</button>
            </div>
        </form>"#,
        escape_html(&defaults.institution_id),
        escape_html(&defaults.max_historical_days),
        escape_html(&defaults.access_valid_for_days),
        scopes,
        cls = INPUT_CLASS
    );
    modal("link-bank-modal", "Link Bank Account", &body)
}

/// Import form with a date window
pub fn render_import_modal(date_from: &str, date_to: &str) -> String {
    let body = format!(
        r#"<form hx-post='/banks/import' hx-target='#import-result' hx-swap='innerHTML' hx-disabled-elt='find button[type=submit]'>
            <div class='grid grid-cols-2 gap-4'>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>From</label><input type='date' name='date_from' value='{}' required class='{cls}'></div>
                <div><label class='block text-sm font-medium text-gray-700 mb-1'>To</label><input type='date' name='date_to' value='{}' required class='{cls}'></div>
            </div>
            <div id='import-result' class='mt-4'></div>
            <div class='flex items-center gap-4 mt-6 pt-4 border-t'>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700 disabled:opacity-50'>Import</button>
            </div>
        </form>"#,
        escape_html(date_from),
        escape_html(date_to),
        cls = INPUT_CLASS
    );
    modal("import-modal", "Import Transactions", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_modal_defaults() {
        let mut defaults = BankLinkConfig::default();
        defaults.access_scope = vec!["balances".to_string()];
        let html = render_link_modal(&defaults);

        assert!(html.contains("value='ING_INGBNL2A'"));
        assert!(html.contains("value='90'"));
        assert!(html.contains("value='180'"));
        assert!(html.contains("value='balances' checked"));
        assert!(html.contains("value='details' >"));
    }

    #[test]
    fn test_import_modal_dates() {
        let html = render_import_modal("2024-01-01", "2024-01-31");
        assert!(html.contains("name='date_from' value='2024-01-01'"));
        assert!(html.contains("name='date_to' value='2024-01-31'"));
    }
}
