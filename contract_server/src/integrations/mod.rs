pub mod docuseal;
