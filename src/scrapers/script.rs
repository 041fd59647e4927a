//! In-page extraction script for the chromium engine.

/// Evaluated in the rendered page; returns a `RawSnapshot`-shaped object.
///
/// Every lookup is null-safe. Degree-suffix cleanup happens on the Rust side.
pub const EXTRACTION_SCRIPT: &str = r#"
(() => {
    const text = (sel) => {
        const el = document.querySelector(sel);
        return el ? el.textContent.trim() : null;
    };
    const html = (sel) => {
        const el = document.querySelector(sel);
        return el ? el.innerHTML.trim().replace(/\n/g, "") : null;
    };
    const icon = document.querySelector('#weather-now-icon');

    return {
        weatherNowNumber: text('#weather-now-number'),
        weatherNowDescription: html('#weather-now-description dl'),
        sun: html('.sun'),
        dwInto: text('.dw-into'),
        daysVerticalTabs: html('#vertical_tabs'),
        iconTitle: icon ? icon.getAttribute('title') : null,
        iconHtml: icon ? icon.outerHTML : null,
        panes: Array.from(document.querySelectorAll('#content-left .pane')).map(p => p.outerHTML),
        slBoxes: Array.from(document.querySelectorAll('.sl-box .sl-item')).map(item => {
            const txt = item.querySelector('.sl-item-txt');
            const all = item.querySelector('.sl-item-all-txt');
            return {
                slItemTxt: txt ? txt.innerHTML.trim() : null,
                slItemAllTxt: all ? all.innerHTML.trim() : null,
            };
        }),
    };
})()
"#;

/// CSS selectors shared by the script and the static DOM extractor.
pub mod selectors {
    pub const READING: &str = "#weather-now-number";
    pub const DESCRIPTION: &str = "#weather-now-description dl";
    pub const SUN: &str = ".sun";
    pub const DW_INTO: &str = ".dw-into";
    pub const VERTICAL_TABS: &str = "#vertical_tabs";
    pub const ICON: &str = "#weather-now-icon";
    pub const PANES: &str = "#content-left .pane";
    pub const SL_ITEMS: &str = ".sl-box .sl-item";
    pub const SL_ITEM_TXT: &str = ".sl-item-txt";
    pub const SL_ITEM_ALL_TXT: &str = ".sl-item-all-txt";
}
