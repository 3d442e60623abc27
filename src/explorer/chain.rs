use std::fmt;
use std::str::FromStr;

use crate::error::VerifyError;

/// Chains with a known verification endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    Ethereum,
    Sepolia,
    Polygon,
    Amoy,
    Arbitrum,
    ArbitrumGoerli,
    Scroll,
    ScrollTestnet,
    Base,
    BaseGoerli,
    Optimism,
    OptimismGoerli,
    Avalanche,
    Fuji,
    Bsc,
    BscTestnet,
}

impl Chain {
    pub const ALL: [Chain; 16] = [
        Chain::Ethereum,
        Chain::Sepolia,
        Chain::Polygon,
        Chain::Amoy,
        Chain::Arbitrum,
        Chain::ArbitrumGoerli,
        Chain::Scroll,
        Chain::ScrollTestnet,
        Chain::Base,
        Chain::BaseGoerli,
        Chain::Optimism,
        Chain::OptimismGoerli,
        Chain::Avalanche,
        Chain::Fuji,
        Chain::Bsc,
        Chain::BscTestnet,
    ];

    /// Base URL of the explorer API that accepts `verifysourcecode` requests.
    pub fn api_url(self) -> &'static str {
        match self {
            Chain::Ethereum => "https://api.etherscan.io/api",
            Chain::Sepolia => "https://api-sepolia.etherscan.io/api",
            Chain::Polygon => "https://api.polygonscan.com/api",
            Chain::Amoy => "https://api-testnet.polygonscan.com/api",
            Chain::Arbitrum => "https://api.arbiscan.io/api",
            Chain::ArbitrumGoerli => "https://api-goerli.arbiscan.io/api",
            Chain::Scroll => "https://blockscout.scroll.io/api",
            Chain::ScrollTestnet => "https://blockscout.scroll.io/api?testnet",
            Chain::Base => "https://api.basescan.org/api",
            Chain::BaseGoerli => "https://api-goerli.basescan.org/api",
            Chain::Optimism => "https://api-optimistic.etherscan.io/api",
            Chain::OptimismGoerli => "https://api-goerli-optimistic.etherscan.io/api",
            Chain::Avalanche => "https://api.snowtrace.io/api",
            Chain::Fuji => "https://api-testnet.snowtrace.io/api",
            Chain::Bsc => "https://api.bscscan.com/api",
            Chain::BscTestnet => "https://api-testnet.bscscan.com/api",
        }
    }

    /// Human-readable name, as offered in chain pickers.
    pub fn label(self) -> &'static str {
        match self {
            Chain::Ethereum => "Ethereum",
            Chain::Sepolia => "Sepolia (Ethereum Testnet)",
            Chain::Polygon => "Polygon",
            Chain::Amoy => "Amoy (Polygon Testnet)",
            Chain::Arbitrum => "Arbitrum",
            Chain::ArbitrumGoerli => "Arbitrum Goerli Testnet",
            Chain::Scroll => "Scroll",
            Chain::ScrollTestnet => "Scroll Testnet",
            Chain::Base => "Base",
            Chain::BaseGoerli => "Base Goerli Testnet",
            Chain::Optimism => "Optimism",
            Chain::OptimismGoerli => "Optimism Goerli Testnet",
            Chain::Avalanche => "Avalanche",
            Chain::Fuji => "Fuji (Avalanche Testnet)",
            Chain::Bsc => "Binance Smart Chain",
            Chain::BscTestnet => "BSC Testnet",
        }
    }

    /// Short identifier used on the command line and as config map key.
    pub fn slug(self) -> &'static str {
        match self {
            Chain::Ethereum => "ethereum",
            Chain::Sepolia => "sepolia",
            Chain::Polygon => "polygon",
            Chain::Amoy => "amoy",
            Chain::Arbitrum => "arbitrum",
            Chain::ArbitrumGoerli => "arbitrum-goerli",
            Chain::Scroll => "scroll",
            Chain::ScrollTestnet => "scroll-testnet",
            Chain::Base => "base",
            Chain::BaseGoerli => "base-goerli",
            Chain::Optimism => "optimism",
            Chain::OptimismGoerli => "optimism-goerli",
            Chain::Avalanche => "avalanche",
            Chain::Fuji => "fuji",
            Chain::Bsc => "bsc",
            Chain::BscTestnet => "bsc-testnet",
        }
    }
}

impl FromStr for Chain {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Chain::ALL
            .into_iter()
            .find(|chain| {
                chain.slug().eq_ignore_ascii_case(wanted) || chain.label().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| VerifyError::UnsupportedChain(s.to_string()))
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_urls() {
        let expected = [
            ("Ethereum", "https://api.etherscan.io/api"),
            ("Sepolia (Ethereum Testnet)", "https://api-sepolia.etherscan.io/api"),
            ("Polygon", "https://api.polygonscan.com/api"),
            ("Amoy (Polygon Testnet)", "https://api-testnet.polygonscan.com/api"),
            ("Arbitrum", "https://api.arbiscan.io/api"),
            ("Arbitrum Goerli Testnet", "https://api-goerli.arbiscan.io/api"),
            ("Scroll", "https://blockscout.scroll.io/api"),
            ("Scroll Testnet", "https://blockscout.scroll.io/api?testnet"),
            ("Base", "https://api.basescan.org/api"),
            ("Base Goerli Testnet", "https://api-goerli.basescan.org/api"),
            ("Optimism", "https://api-optimistic.etherscan.io/api"),
            ("Optimism Goerli Testnet", "https://api-goerli-optimistic.etherscan.io/api"),
            ("Avalanche", "https://api.snowtrace.io/api"),
            ("Fuji (Avalanche Testnet)", "https://api-testnet.snowtrace.io/api"),
            ("Binance Smart Chain", "https://api.bscscan.com/api"),
            ("BSC Testnet", "https://api-testnet.bscscan.com/api"),
        ];

        assert_eq!(expected.len(), Chain::ALL.len());
        for (label, url) in expected {
            let chain: Chain = label.parse().unwrap();
            assert_eq!(chain.api_url(), url, "wrong url for {}", label);
        }
    }

    #[test]
    fn test_parse_slug_and_label() {
        assert_eq!("bsc".parse::<Chain>().unwrap(), Chain::Bsc);
        assert_eq!("Binance Smart Chain".parse::<Chain>().unwrap(), Chain::Bsc);
        assert_eq!("  SEPOLIA ".parse::<Chain>().unwrap(), Chain::Sepolia);
        assert_eq!("scroll-testnet".parse::<Chain>().unwrap(), Chain::ScrollTestnet);

        for chain in Chain::ALL {
            assert_eq!(chain.slug().parse::<Chain>().unwrap(), chain);
            assert_eq!(chain.label().parse::<Chain>().unwrap(), chain);
        }
    }

    #[test]
    fn test_unknown_chain() {
        let err = "Solana".parse::<Chain>().unwrap_err();
        assert!(matches!(err, VerifyError::UnsupportedChain(ref s) if s == "Solana"));
        assert!("".parse::<Chain>().is_err());
    }
}
