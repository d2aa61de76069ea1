pub mod qiita;
