//! JavaScript executed in the dashboard page.
//!
//! Scripts take their inputs through `arguments` and return plain JSON so
//! the session never holds element references across React re-renders.

/// Click the first visible, enabled element matching an XPath.
/// `arguments[0]`: XPath. Returns `true` if something was clicked.
pub const CLICK_XPATH: &str = r#"
var node = document.evaluate(arguments[0], document, null,
    XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;
if (!node || node.offsetParent === null || node.disabled) { return false; }
node.click();
return true;
"#;

pub const READY_STATE: &str = "return document.readyState;";

/// `arguments[0]`: table body selector. Returns `null` when the table is
/// absent, otherwise its markup length and whether it still shows a loader.
pub const TABLE_STATE: &str = r#"
var body = document.querySelector(arguments[0]);
if (!body) { return null; }
var html = body.innerHTML || '';
return { length: html.length, loading: html.indexOf('Loading') !== -1 };
"#;

/// `arguments[0]`: row selector, `arguments[1]`: order link selector.
/// Snapshots rendered rows of the virtualized table.
pub const SNAPSHOT_ROWS: &str = r#"
var linkSelector = arguments[1];
var rows = Array.prototype.slice.call(document.querySelectorAll(arguments[0]));
return rows
  .filter(function (row) {
    return (row.getAttribute('style') || '').indexOf('position: absolute') !== -1;
  })
  .map(function (row) {
    var link = row.querySelector(linkSelector);
    var cells = row.querySelectorAll("div[role='cell']");
    var titled = row.querySelectorAll('div[title]');
    return {
      href: link ? link.href : null,
      cellTitles: Array.prototype.map.call(cells, function (c) { return c.getAttribute('title') || ''; }),
      titles: Array.prototype.map.call(titled, function (d) { return d.getAttribute('title') || ''; })
    };
  });
"#;

/// `arguments[0]`: order link selector, `arguments[1]`: slug.
/// Clicks the row link of that exact order. Returns `false` when it is gone.
pub const OPEN_ORDER: &str = r#"
var links = document.querySelectorAll(arguments[0]);
for (var i = 0; i < links.length; i++) {
  var m = /\/trader\/orders\/(trade-[^\/?]+)/.exec(links[i].href || '');
  if (m && m[1] === arguments[1]) { links[i].click(); return true; }
}
return false;
"#;

/// Locates the Amount row of the filter panel.
/// `arguments[0]`: row class, `arguments[1]`: accepted labels.
macro_rules! with_amount_row {
    ($body:literal) => {
        concat!(
            r#"
var filterRows = Array.prototype.slice.call(document.getElementsByClassName(arguments[0]));
var row = null;
for (var i = 0; i < filterRows.length && !row; i++) {
  var spans = filterRows[i].querySelectorAll('span');
  for (var j = 0; j < spans.length; j++) {
    if (arguments[1].indexOf(spans[j].textContent.trim()) !== -1) { row = filterRows[i]; break; }
  }
}
if (!row && filterRows.length >= 4) { row = filterRows[3]; }
if (!row && filterRows.length > 0) { row = filterRows[filterRows.length - 1]; }
var block = row ? row.parentNode : null;
function visible(el) { return el.offsetParent !== null; }
"#,
            $body
        )
    };
}

/// Ticks the Amount checkbox. Returns `missing`, `no_checkbox`, `checked`
/// or `clicked`.
pub const ENABLE_AMOUNT_ROW: &str = with_amount_row!(
    r#"
if (!row) { return 'missing'; }
var checkbox = row.querySelector("input[type='checkbox']");
if (!checkbox) { return 'no_checkbox'; }
if (checkbox.checked || checkbox.hasAttribute('checked')) { return 'checked'; }
checkbox.click();
return 'clicked';
"#
);

/// Switches the Amount comparison to `is_between` through the native value
/// setter so React sees the change. Returns `missing`, `unchanged` or `changed`.
pub const SELECT_BETWEEN: &str = with_amount_row!(
    r#"
if (!block) { return 'missing'; }
var select = Array.prototype.filter.call(block.getElementsByTagName('select'), visible)[0];
if (!select) { return 'missing'; }
if (select.value === 'is_between') { return 'unchanged'; }
var setter = Object.getOwnPropertyDescriptor(window.HTMLSelectElement.prototype, 'value').set;
setter.call(select, 'is_between');
select.dispatchEvent(new Event('change', { bubbles: true }));
return 'changed';
"#
);

/// `arguments[2]`: min or `null`, `arguments[3]`: max or `null`.
/// Fills the visible Amount inputs. Returns how many inputs were visible.
pub const FILL_AMOUNT_INPUTS: &str = with_amount_row!(
    r#"
if (!block) { return 0; }
var inputs = Array.prototype.filter.call(
  block.querySelectorAll("input:not([type='checkbox'])"), visible);
var setter = Object.getOwnPropertyDescriptor(window.HTMLInputElement.prototype, 'value').set;
function fill(input, value) {
  setter.call(input, value);
  input.dispatchEvent(new Event('input', { bubbles: true }));
  input.dispatchEvent(new Event('change', { bubbles: true }));
}
if (inputs.length >= 2) {
  if (arguments[2] !== null) { fill(inputs[0], arguments[2]); }
  if (arguments[3] !== null) { fill(inputs[1], arguments[3]); }
} else if (inputs.length === 1) {
  var single = arguments[2] !== null ? arguments[2] : arguments[3];
  if (single !== null) { fill(inputs[0], single); }
}
return inputs.length;
"#
);
