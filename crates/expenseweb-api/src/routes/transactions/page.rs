//! Add/edit modal rendering

use expenseweb_core::{FormMode, TransactionFormController, TransactionType};
use expenseweb_utils::escape_html;

const INPUT_CLASS: &str = "w-full px-3 py-2.5 border rounded-lg focus:ring-2 focus:ring-indigo-500";

/// Modal dialog holding one form instance
pub fn render_modal(form_id: &str, form: &TransactionFormController) -> String {
    let title = match form.mode() {
        FormMode::Add => "Add Transaction",
        FormMode::Edit => "Edit Transaction",
    };
    let notice = if form.mode() == FormMode::Edit && form.record().is_none() {
        "<p class='mb-4 text-sm text-yellow-700 bg-yellow-50 border border-yellow-200 rounded-lg p-3'>No transaction selected; saving does nothing.</p>"
    } else {
        ""
    };
    let fields = form.fields();

    format!(
        r#"<div id='modal-{id}' class='fixed inset-0 bg-black bg-opacity-40 flex items-center justify-center z-50'>
    <div class='bg-white rounded-xl shadow-lg p-6 w-full max-w-2xl max-h-screen overflow-auto'>
        <div class='flex items-center justify-between mb-4'>
            <h3 class='text-lg font-semibold'>{title}</h3>
            <button type='button' hx-delete='/forms/{id}' hx-target='#modal-{id}' hx-swap='outerHTML' class='text-gray-400 hover:text-gray-600'>✕</button>
        </div>
        {notice}
        <form hx-post='/forms/{id}/submit' hx-target='#form-result-{id}' hx-swap='innerHTML' hx-disabled-elt='find button[type=submit]'>
            <div class='space-y-4'>
                <div class='grid grid-cols-2 gap-4'>
                    {transaction_id}
                    {end_to_end_id}
                </div>
                <div class='grid grid-cols-3 gap-4'>
                    {booking_date}
                    {amount}
                    {currency}
                </div>
                <div class='grid grid-cols-2 gap-4'>
                    {debtor_name}
                    {debtor_iban}
                    {creditor_name}
                    {creditor_iban}
                </div>
                {remittance_info}
                <div class='grid grid-cols-2 gap-4'>
                    {bank_transaction_code}
                    {internal_transaction_id}
                </div>
                <div class='grid grid-cols-3 gap-4'>
                    {transaction_type}
                    {category}
                    {sub_category}
                </div>
            </div>
            <div id='form-result-{id}' class='mt-4'></div>
            <div class='flex items-center gap-4 mt-6 pt-4 border-t'>
                <button type='submit' class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700 disabled:opacity-50'>Save</button>
                <button type='button' hx-delete='/forms/{id}' hx-target='#modal-{id}' hx-swap='outerHTML' class='px-4 py-2 border rounded-lg hover:bg-gray-50'>Cancel</button>
            </div>
        </form>
    </div>
</div>"#,
        id = escape_html(form_id),
        title = title,
        notice = notice,
        transaction_id = text_input("transaction_id", "Transaction ID", &fields.transaction_id, "text"),
        end_to_end_id = text_input("end_to_end_id", "End-to-End ID", &fields.end_to_end_id, "text"),
        booking_date = text_input("booking_date", "Booking Date", &fields.booking_date, "date"),
        amount = amount_input(fields.amount_value),
        currency = text_input("currency", "Currency", &fields.currency, "text"),
        debtor_name = text_input("debtor_name", "Debtor Name", &fields.debtor_name, "text"),
        debtor_iban = text_input("debtor_iban", "Debtor IBAN", &fields.debtor_iban, "text"),
        creditor_name = text_input("creditor_name", "Creditor Name", &fields.creditor_name, "text"),
        creditor_iban = text_input("creditor_iban", "Creditor IBAN", &fields.creditor_iban, "text"),
        remittance_info = text_input("remittance_info", "Description", &fields.remittance_info, "text"),
        bank_transaction_code = text_input("bank_transaction_code", "Bank Transaction Code", &fields.bank_transaction_code, "text"),
        internal_transaction_id = text_input("internal_transaction_id", "Internal Transaction ID", &fields.internal_transaction_id, "text"),
        transaction_type = type_select(fields.transaction_type),
        category = render_category_select(form_id, form),
        sub_category = render_sub_category_select(form_id, form),
    )
}

fn text_input(name: &str, label: &str, value: &str, input_type: &str) -> String {
    format!(
        "<div><label class='block text-sm font-medium text-gray-700 mb-1'>{}</label><input type='{}' name='{}' value='{}' class='{}'></div>",
        label,
        input_type,
        name,
        escape_html(value),
        INPUT_CLASS
    )
}

fn amount_input(value: f64) -> String {
    format!(
        "<div><label class='block text-sm font-medium text-gray-700 mb-1'>Amount</label><input type='number' step='any' name='amount' value='{}' class='{}'></div>",
        value, INPUT_CLASS
    )
}

fn type_select(selected: TransactionType) -> String {
    let option = |t: TransactionType, label: &str| {
        format!(
            "<option value='{}' {}>{}</option>",
            t,
            if t == selected { "selected" } else { "" },
            label
        )
    };
    format!(
        "<div><label class='block text-sm font-medium text-gray-700 mb-1'>Type</label><select name='transaction_type' class='{}'>{}{}</select></div>",
        INPUT_CLASS,
        option(TransactionType::Expense, "Expense"),
        option(TransactionType::Income, "Income")
    )
}

/// Category dropdown; a change posts back and swaps the sub-category select.
///
/// A stored category missing from a loaded taxonomy is shown but not
/// selectable, so saving without picking again leaves it out of the document.
/// When no taxonomy loaded at all the stored value stays selected.
pub fn render_category_select(form_id: &str, form: &TransactionFormController) -> String {
    let selected = form.selected_category();
    let known = form.categories().iter().any(|c| c.id == selected);
    let retired = !selected.is_empty() && !known && !form.categories().is_empty();

    let mut options = format!(
        "<option value='' {}>Select category</option>",
        if selected.is_empty() || retired { "selected" } else { "" }
    );
    for category in form.categories() {
        options.push_str(&format!(
            "<option value='{0}' {1}>{0}</option>",
            escape_html(&category.id),
            if category.id == selected { "selected" } else { "" }
        ));
    }
    if retired {
        options.push_str(&format!(
            "<option value='{0}' disabled>{0} (no longer available)</option>",
            escape_html(selected)
        ));
    } else if !selected.is_empty() && !known {
        options.push_str(&format!("<option value='{0}' selected>{0}</option>", escape_html(selected)));
    }

    format!(
        "<div><label class='block text-sm font-medium text-gray-700 mb-1'>Category</label><select name='category' hx-post='/forms/{id}/category' hx-trigger='change' hx-target='#sub-category-{id}' hx-swap='outerHTML' class='{cls}'>{options}</select></div>",
        id = escape_html(form_id),
        cls = INPUT_CLASS,
        options = options
    )
}

/// Sub-category dropdown, limited to the derived options
pub fn render_sub_category_select(form_id: &str, form: &TransactionFormController) -> String {
    let selected = form.selected_sub_category();
    let options = form.sub_category_options();

    let mut html = format!(
        "<option value='' {}>(none)</option>",
        if selected.is_empty() { "selected" } else { "" }
    );
    for option in options {
        html.push_str(&format!(
            "<option value='{0}' {1}>{0}</option>",
            escape_html(option),
            if option == selected { "selected" } else { "" }
        ));
    }

    format!(
        "<div id='sub-category-{id}'><label class='block text-sm font-medium text-gray-700 mb-1'>Sub-category</label><select name='sub_category' class='{cls}' {disabled}>{options}</select></div>",
        id = escape_html(form_id),
        cls = INPUT_CLASS,
        disabled = if options.is_empty() { "disabled" } else { "" },
        options = html
    )
}
